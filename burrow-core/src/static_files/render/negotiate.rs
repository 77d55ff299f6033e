use std::fs::Metadata;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

use crate::conf::CompressionConfig;
use crate::static_files::ServeError;
use crate::static_files::render::compression::{
    Encoding, apply_compression, candidate_encodings, is_compressible_mime,
};
use crate::static_files::render::range::{RangeRequest, parse_range_header};

/// The bytes chosen to answer a request, before any range is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Representation {
    Identity {
        len: u64,
    },
    /// A `.br`/`.gz` sibling stored next to the source file.
    Precompressed {
        path: PathBuf,
        len: u64,
        encoding: Encoding,
    },
    /// Compressed in memory for this request.
    Compressed {
        bytes: Bytes,
        encoding: Encoding,
    },
}

impl Representation {
    pub(crate) fn len(&self) -> u64 {
        match self {
            Representation::Identity { len } => *len,
            Representation::Precompressed { len, .. } => *len,
            Representation::Compressed { bytes, .. } => bytes.len() as u64,
        }
    }

    pub(crate) fn encoding(&self) -> Encoding {
        match self {
            Representation::Identity { .. } => Encoding::Identity,
            Representation::Precompressed { encoding, .. } => *encoding,
            Representation::Compressed { encoding, .. } => *encoding,
        }
    }
}

/// Stage one: pick the encoding and the bytes that carry it.
///
/// Candidates are tried in server precedence (brotli, then gzip). A fresh
/// pre-compressed sibling for any candidate wins; otherwise the source is
/// compressed on the fly when that is enabled and the file is eligible.
/// Identity is the fallback.
pub(crate) async fn choose_representation(
    source: &Path,
    metadata: &Metadata,
    mime: &mime_guess::Mime,
    accept_encoding: Option<&str>,
    cfg: &CompressionConfig,
) -> Result<Representation, ServeError> {
    let size = metadata.len();
    let identity = Representation::Identity { len: size };

    let candidates = candidate_encodings(accept_encoding, cfg.enable_brotli, cfg.enable_gzip);
    if candidates.is_empty() {
        return Ok(identity);
    }

    for encoding in &candidates {
        if let Some(sibling) = fresh_sibling(source, metadata, *encoding).await {
            return Ok(sibling);
        }
    }

    let eligible = cfg.on_the_fly
        && is_compressible_mime(mime)
        && size >= cfg.min_compress_size
        && size <= cfg.small_file_threshold;
    if !eligible {
        return Ok(identity);
    }

    let data = fs::read(source).await.map_err(ServeError::from_io)?;
    for encoding in candidates {
        if let Some(compressed) = apply_compression(encoding, &data) {
            return Ok(Representation::Compressed {
                bytes: Bytes::from(compressed),
                encoding,
            });
        }
    }

    Ok(identity)
}

/// Stage two: the byte window of the chosen representation.
pub(crate) fn select_window(range: Option<&str>, representation_len: u64) -> RangeRequest {
    match range {
        Some(header) => parse_range_header(header, representation_len),
        None => RangeRequest::Ignore,
    }
}

/// A sibling is used only when it is a regular file at least as new as the
/// source. Symlinked siblings are ignored.
async fn fresh_sibling(
    source: &Path,
    source_meta: &Metadata,
    encoding: Encoding,
) -> Option<Representation> {
    let suffix = encoding.sibling_suffix()?;
    let mut raw = source.as_os_str().to_owned();
    raw.push(".");
    raw.push(suffix);
    let path = PathBuf::from(raw);

    let meta = fs::symlink_metadata(&path).await.ok()?;
    if !meta.is_file() {
        return None;
    }

    let source_mtime = source_meta.modified().ok()?;
    let sibling_mtime = meta.modified().ok()?;
    if sibling_mtime < source_mtime {
        tracing::debug!(path = %path.display(), "ignoring stale pre-compressed sibling");
        return None;
    }

    Some(Representation::Precompressed {
        path,
        len: meta.len(),
        encoding,
    })
}
