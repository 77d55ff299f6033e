use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Identity,
    Gzip,
    Brotli,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Identity => "identity",
            Encoding::Gzip => "gzip",
            Encoding::Brotli => "br",
        }
    }

    /// Suffix of the pre-compressed sibling artifact.
    pub fn sibling_suffix(&self) -> Option<&'static str> {
        match self {
            Encoding::Identity => None,
            Encoding::Gzip => Some("gz"),
            Encoding::Brotli => Some("br"),
        }
    }
}

/// Check if a MIME type is compressible (text-based or common web formats)
pub(crate) fn is_compressible_mime(mime: &mime_guess::Mime) -> bool {
    let type_ = mime.type_();
    let subtype = mime.subtype();

    // Text types are always compressible
    if type_ == "text" {
        return true;
    }

    // Application types that are text-based
    if type_ == "application" {
        return matches!(
            subtype.as_str(),
            "json"
                | "javascript"
                | "x-javascript"
                | "xml"
                | "xhtml+xml"
                | "rss+xml"
                | "atom+xml"
                | "svg+xml"
                | "wasm"
        );
    }

    // SVG images
    type_ == "image" && subtype == "svg+xml"
}

/// Parse quality value from Accept-Encoding part (e.g., "gzip;q=0.5" -> 0.5)
fn parse_quality(part: &str) -> f32 {
    part.split(';')
        .skip(1)
        .find_map(|s| s.trim().strip_prefix("q="))
        .and_then(|s| s.trim().parse::<f32>().ok())
        .unwrap_or(1.0)
}

/// Check if the client accepts a specific encoding and return its quality value.
///
/// An explicit entry for the encoding wins over `*`.
pub(crate) fn accepts_encoding(accept_encoding: &str, encoding_name: &str) -> Option<f32> {
    let mut wildcard = None;

    for part in accept_encoding.split(',') {
        let encoding = part.split(';').next().unwrap_or("").trim();
        if encoding.eq_ignore_ascii_case(encoding_name) {
            let q = parse_quality(part);
            // q=0 means "not acceptable"
            return (q > 0.0).then_some(q);
        }
        if encoding == "*" {
            wildcard = Some(parse_quality(part));
        }
    }

    wildcard.filter(|q| *q > 0.0)
}

/// Candidate encodings in server precedence order: brotli, then gzip.
pub(crate) fn candidate_encodings(
    accept_encoding: Option<&str>,
    enable_brotli: bool,
    enable_gzip: bool,
) -> Vec<Encoding> {
    let Some(ae) = accept_encoding else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(2);
    if enable_brotli && accepts_encoding(ae, "br").is_some() {
        out.push(Encoding::Brotli);
    }
    if enable_gzip && accepts_encoding(ae, "gzip").is_some() {
        out.push(Encoding::Gzip);
    }
    out
}

/// Compress data using gzip
pub(crate) fn gzip_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Compress data using brotli
pub(crate) fn brotli_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut output = Vec::new();
    // Quality 4 keeps per-request latency low.
    let params = brotli::enc::BrotliEncoderParams {
        quality: 4,
        lgwin: 22,
        ..Default::default()
    };
    brotli::enc::BrotliCompress(&mut std::io::Cursor::new(data), &mut output, &params)?;
    Ok(output)
}

/// Compresses `data` with `encoding`. Returns `None` when compression failed
/// or did not shrink the payload.
pub(crate) fn apply_compression(encoding: Encoding, data: &[u8]) -> Option<Vec<u8>> {
    let result = match encoding {
        Encoding::Brotli => brotli_compress(data),
        Encoding::Gzip => gzip_compress(data),
        Encoding::Identity => return None,
    };

    match result {
        Ok(compressed) if compressed.len() < data.len() => Some(compressed),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, encoding = encoding.as_str(), "compression failed");
            None
        }
    }
}
