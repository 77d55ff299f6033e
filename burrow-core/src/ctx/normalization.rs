use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::path::PathBuf;

/// Characters escaped when a decoded segment is written back into a URI path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    /// A `..` segment climbs above the document root.
    Traversal,
    /// NUL byte, invalid UTF-8 after decoding, or an encoded separator.
    Malformed,
}

/// A decoded, dot-segment-free request path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl RequestPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Relative filesystem path (no leading separator).
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Decoded form, e.g. `/docs/read me.txt`. Used for display only.
    pub fn display(&self) -> String {
        let mut out = String::from("/");
        out.push_str(&self.segments.join("/"));
        if self.trailing_slash && !self.segments.is_empty() {
            out.push('/');
        }
        out
    }

    /// Percent-encoded form suitable for a `Location` header.
    pub fn to_uri_path(&self) -> String {
        let mut out = String::from("/");
        let encoded = self
            .segments
            .iter()
            .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>();
        out.push_str(&encoded.join("/"));
        if self.trailing_slash && !self.segments.is_empty() {
            out.push('/');
        }
        out
    }

    /// The same path with a trailing slash.
    pub fn with_trailing_slash(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            trailing_slash: true,
        }
    }
}

/// Decodes and normalizes a raw URI path.
///
/// - Each segment is percent-decoded exactly once.
/// - Empty and `.` segments are dropped; `..` pops the previous segment.
/// - A `..` with nothing left to pop is a traversal attempt.
/// - Decoded segments may not contain separators or NUL bytes.
pub fn normalize_path(raw: &str) -> Result<RequestPath, PathRejection> {
    if raw.as_bytes().contains(&0) {
        return Err(PathRejection::Malformed);
    }

    let trailing_slash = raw.ends_with('/');
    let mut segments: Vec<String> = Vec::new();

    for segment in raw.split('/') {
        let decoded = percent_decode_str(segment)
            .decode_utf8()
            .map_err(|_| PathRejection::Malformed)?;

        match decoded.as_ref() {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathRejection::Traversal);
                }
            }
            s => {
                if s.contains(['/', '\\', '\0']) {
                    return Err(PathRejection::Malformed);
                }
                segments.push(s.to_string());
            }
        }
    }

    Ok(RequestPath {
        segments,
        trailing_slash,
    })
}
