use std::hash::BuildHasher;
use std::path::Path;
use std::time::SystemTime;

use httpdate::parse_http_date;

// Fixed seeds keep tags identical across restarts.
const ETAG_SEEDS: (u64, u64, u64, u64) = (
    0x6275_7272_6f77_0001,
    0x6275_7272_6f77_0002,
    0x6275_7272_6f77_0003,
    0x6275_7272_6f77_0004,
);

/// Generate a weak ETag from the file path, size and modification time.
/// Format: `W/"<size hex>-<digest hex>"`
pub(crate) fn generate_etag(path: &Path, size: u64, modified: Option<SystemTime>) -> String {
    let mtime_nanos = modified
        .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let state = ahash::RandomState::with_seeds(
        ETAG_SEEDS.0,
        ETAG_SEEDS.1,
        ETAG_SEEDS.2,
        ETAG_SEEDS.3,
    );
    let digest = state.hash_one((path, size, mtime_nanos));

    format!("W/\"{:x}-{:x}\"", size, digest)
}

/// Check if the ETag matches the If-None-Match header value.
/// Handles both strong and weak comparison (weak by default for our ETags).
pub(crate) fn etag_matches(etag: &str, if_none_match: &str) -> bool {
    // Handle "*" which matches any ETag
    if if_none_match.trim() == "*" {
        return true;
    }

    let etag_value = etag.strip_prefix("W/").unwrap_or(etag);

    // Parse comma-separated list of ETags
    if_none_match.split(',').any(|candidate| {
        let candidate = candidate.trim();
        // Strip W/ prefix for weak comparison
        let candidate_value = candidate.strip_prefix("W/").unwrap_or(candidate);
        candidate_value == etag_value
    })
}

/// Check if the file has been modified since the given date.
pub(crate) fn modified_since(file_modified: Option<SystemTime>, if_modified_since: &str) -> bool {
    let file_time = match file_modified {
        Some(t) => t,
        None => return true, // Unknown mtime, assume modified
    };

    let since_time = match parse_http_date(if_modified_since) {
        Ok(t) => t,
        Err(_) => return true, // Invalid header, assume modified
    };

    // HTTP dates have 1-second resolution; compare whole seconds.
    match file_time.duration_since(since_time) {
        Ok(delta) => delta.as_secs() >= 1,
        Err(_) => false, // file_time <= since_time, not modified
    }
}
