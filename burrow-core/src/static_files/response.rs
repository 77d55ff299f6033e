use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    Forbidden,
    #[error("i/o error: {0}")]
    Io(#[source] std::io::Error),
}

impl ServeError {
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ServeError::NotFound,
            std::io::ErrorKind::PermissionDenied => ServeError::Forbidden,
            _ => ServeError::Io(err),
        }
    }
}

pub enum StaticBody {
    Empty,
    /// Small files, listings and in-memory compressed bodies.
    Bytes(Bytes),
    /// Large files streamed from disk, already positioned at the window start.
    RangedFile {
        file: fs::File,
        remaining: u64,
    },
}

impl std::fmt::Debug for StaticBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaticBody::Empty => f.write_str("Empty"),
            StaticBody::Bytes(b) => write!(f, "Bytes({})", b.len()),
            StaticBody::RangedFile { remaining, .. } => write!(f, "RangedFile({remaining})"),
        }
    }
}

#[derive(Debug)]
pub struct StaticResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: StaticBody,
}

impl StaticResponse {
    pub fn empty(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            body: StaticBody::Empty,
        }
    }
}

/// Request headers that drive validation and content negotiation.
#[derive(Debug, Default, Clone)]
pub struct ConditionalHeaders {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub accept_encoding: Option<String>,
    pub range: Option<String>,
}

impl ConditionalHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: http::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };

        Self {
            if_none_match: get(http::header::IF_NONE_MATCH),
            if_modified_since: get(http::header::IF_MODIFIED_SINCE),
            accept_encoding: get(http::header::ACCEPT_ENCODING),
            range: get(http::header::RANGE),
        }
    }
}
