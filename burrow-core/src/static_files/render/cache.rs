use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use httpdate::fmt_http_date;

use crate::static_files::ConditionalHeaders;
use crate::static_files::render::etag::{etag_matches, generate_etag, modified_since};

/// Validators computed from a file's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileValidators {
    pub etag: String,
    pub last_modified: Option<String>,
    pub modified: Option<SystemTime>,
    pub size: u64,
}

impl FileValidators {
    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let modified = metadata.modified().ok();
        let size = metadata.len();

        Self {
            etag: generate_etag(path, size, modified),
            last_modified: modified.map(fmt_http_date),
            modified,
            size,
        }
    }

    /// A request is fresh when either validator says so.
    pub(crate) fn is_not_modified(&self, conditional: &ConditionalHeaders) -> bool {
        let etag_fresh = conditional
            .if_none_match
            .as_deref()
            .is_some_and(|inm| etag_matches(&self.etag, inm));

        let date_fresh = conditional
            .if_modified_since
            .as_deref()
            .is_some_and(|ims| !modified_since(self.modified, ims));

        etag_fresh || date_fresh
    }
}
