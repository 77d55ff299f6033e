#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64, // inclusive
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeRequest {
    /// No usable `bytes=` header; serve the full body.
    Ignore,
    Satisfiable(ByteRange),
    Unsatisfiable,
}

pub(crate) fn parse_range_header(header: &str, size: u64) -> RangeRequest {
    let header = header.trim();

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeRequest::Ignore;
    };

    // Only single ranges are supported.
    if spec.contains(',') {
        return RangeRequest::Unsatisfiable;
    }

    let Some((start, end)) = spec.trim().split_once('-') else {
        return RangeRequest::Ignore;
    };
    let (start, end) = (start.trim(), end.trim());

    let bounds = match (start.is_empty(), end.is_empty()) {
        (true, true) => return RangeRequest::Ignore,
        // bytes=-N: the last N bytes.
        (true, false) => match end.parse::<u64>() {
            Ok(0) => return RangeRequest::Unsatisfiable,
            Ok(suffix) => (size.saturating_sub(suffix), size.saturating_sub(1)),
            Err(_) => return RangeRequest::Ignore,
        },
        (false, true) => match start.parse::<u64>() {
            Ok(s) => (s, size.saturating_sub(1)),
            Err(_) => return RangeRequest::Ignore,
        },
        (false, false) => match (start.parse::<u64>(), end.parse::<u64>()) {
            (Ok(s), Ok(e)) => (s, e.min(size.saturating_sub(1))),
            _ => return RangeRequest::Ignore,
        },
    };

    let (start, end) = bounds;
    if size == 0 || start >= size || start > end {
        return RangeRequest::Unsatisfiable;
    }

    RangeRequest::Satisfiable(ByteRange { start, end })
}
