use std::io::SeekFrom;
use std::path::Path;

use bytes::Bytes;
use http::StatusCode;
use mime_guess::Mime;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::conf::ServerConfig;
use crate::static_files::render::cache::FileValidators;
use crate::static_files::render::compression::Encoding;
use crate::static_files::render::headers::HeaderBuilder;
use crate::static_files::render::negotiate::{
    Representation, choose_representation, select_window,
};
use crate::static_files::render::range::{ByteRange, RangeRequest};
use crate::static_files::{ConditionalHeaders, ServeError, StaticBody, StaticResponse};

pub async fn render_file(
    path: &Path,
    conditional: &ConditionalHeaders,
    config: &ServerConfig,
) -> Result<StaticResponse, ServeError> {
    let metadata = fs::metadata(path).await.map_err(ServeError::from_io)?;

    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let validators = FileValidators::from_metadata(path, &metadata);
    let mime = guess_mime(path, &config.default_content_type);

    // Headers shared by 200, 206 and 304.
    let mut headers = HeaderBuilder::default();
    headers.accept_ranges();
    headers.content_type(&content_type_value(&mime));
    headers.etag(&validators.etag);
    if let Some(lm) = &validators.last_modified {
        headers.last_modified(lm);
    }
    headers.cache_control(&config.cache);
    if config.compression.any_enabled() {
        headers.vary();
    }

    if validators.is_not_modified(conditional) {
        return Ok(StaticResponse::empty(StatusCode::NOT_MODIFIED, headers.build()));
    }

    let representation = choose_representation(
        path,
        &metadata,
        &mime,
        conditional.accept_encoding.as_deref(),
        &config.compression,
    )
    .await?;

    let total = representation.len();
    let window = match select_window(conditional.range.as_deref(), total) {
        RangeRequest::Ignore => None,
        RangeRequest::Satisfiable(range) => Some(range),
        RangeRequest::Unsatisfiable => {
            headers.content_range_unsatisfied(total);
            headers.content_length(0);
            return Ok(StaticResponse::empty(
                StatusCode::RANGE_NOT_SATISFIABLE,
                headers.build(),
            ));
        }
    };

    let encoding = representation.encoding();
    if encoding != Encoding::Identity {
        headers.content_encoding(encoding.as_str());
    }

    let status = match window {
        Some(range) => {
            headers.content_range(range, total);
            headers.content_length(range.len());
            StatusCode::PARTIAL_CONTENT
        }
        None => {
            headers.content_length(total);
            StatusCode::OK
        }
    };

    let threshold = config.compression.small_file_threshold;
    let body = match representation {
        Representation::Compressed { bytes, .. } => StaticBody::Bytes(slice_window(bytes, window)),
        Representation::Precompressed { path, len, .. } => {
            file_body(&path, len, window, threshold).await?
        }
        Representation::Identity { len } => file_body(path, len, window, threshold).await?,
    };

    Ok(StaticResponse {
        status,
        headers: headers.build(),
        body,
    })
}

/// Small files are read into memory; larger ones are streamed from disk.
async fn file_body(
    path: &Path,
    len: u64,
    window: Option<ByteRange>,
    threshold: u64,
) -> Result<StaticBody, ServeError> {
    let mut file = fs::File::open(path).await.map_err(ServeError::from_io)?;

    if len <= threshold {
        let mut buf = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buf)
            .await
            .map_err(ServeError::from_io)?;
        return Ok(StaticBody::Bytes(slice_window(Bytes::from(buf), window)));
    }

    match window {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(ServeError::from_io)?;
            Ok(StaticBody::RangedFile {
                file,
                remaining: range.len(),
            })
        }
        None => Ok(StaticBody::RangedFile {
            file,
            remaining: len,
        }),
    }
}

/// Clamps to the buffer so a file that shrank after `stat` cannot panic.
fn slice_window(bytes: Bytes, window: Option<ByteRange>) -> Bytes {
    let Some(range) = window else {
        return bytes;
    };
    let len = bytes.len();
    let start = (range.start as usize).min(len);
    let end = (range.end as usize).saturating_add(1).min(len);
    bytes.slice(start..end)
}

fn guess_mime(path: &Path, default_content_type: &str) -> Mime {
    mime_guess::from_path(path).first().unwrap_or_else(|| {
        default_content_type
            .parse()
            .unwrap_or(mime_guess::mime::APPLICATION_OCTET_STREAM)
    })
}

fn content_type_value(mime: &Mime) -> String {
    let textual = mime.type_() == mime_guess::mime::TEXT
        || matches!(mime.subtype().as_str(), "javascript" | "json");

    if textual && mime.get_param(mime_guess::mime::CHARSET).is_none() {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}
