use crate::conf::CachePolicy;
use crate::static_files::render::range::ByteRange;
use http::{HeaderMap, HeaderName, HeaderValue, header};

#[derive(Debug, Default)]
pub(crate) struct HeaderBuilder {
    headers: HeaderMap,
}

impl HeaderBuilder {
    /// Inserts `value` under `header_name`, or removes the header when the
    /// value is empty or not a valid header value.
    pub(crate) fn insert(&mut self, header_name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) if !v.is_empty() => {
                self.headers.insert(header_name, v);
            }
            _ => {
                self.headers.remove(header_name);
            }
        }
    }

    pub(crate) fn accept_ranges(&mut self) {
        self.insert(header::ACCEPT_RANGES, "bytes");
    }

    pub(crate) fn content_type(&mut self, value: &str) {
        self.insert(header::CONTENT_TYPE, value);
    }

    pub(crate) fn content_length(&mut self, len: u64) {
        self.insert(header::CONTENT_LENGTH, &len.to_string());
    }

    pub(crate) fn content_range(&mut self, range: ByteRange, len: u64) {
        self.insert(
            header::CONTENT_RANGE,
            &format!("bytes {}-{}/{}", range.start, range.end, len),
        );
    }

    pub(crate) fn content_range_unsatisfied(&mut self, len: u64) {
        self.insert(header::CONTENT_RANGE, &format!("bytes */{len}"));
    }

    pub(crate) fn content_encoding(&mut self, value: &str) {
        self.insert(header::CONTENT_ENCODING, value);
    }

    pub(crate) fn etag(&mut self, value: &str) {
        self.insert(header::ETAG, value);
    }

    pub(crate) fn last_modified(&mut self, value: &str) {
        self.insert(header::LAST_MODIFIED, value);
    }

    pub(crate) fn vary(&mut self) {
        self.insert(header::VARY, "Accept-Encoding");
    }

    pub(crate) fn cache_control(&mut self, policy: &CachePolicy) {
        self.insert(header::CACHE_CONTROL, &policy.header_value());
    }

    pub(crate) fn no_store(&mut self) {
        self.insert(header::CACHE_CONTROL, "no-store");
    }

    pub(crate) fn location(&mut self, value: &str) {
        self.insert(header::LOCATION, value);
    }

    pub(crate) fn build(self) -> HeaderMap {
        self.headers
    }
}
