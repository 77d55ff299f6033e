use crate::conf::ServerConfig;
use crate::ctx::RequestPath;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const INDEX_FILE: &str = "index.html";

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    NotFound,
    Forbidden,
    BadPath,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
    /// Directory requested without its trailing slash; carries the new URI path.
    Redirect(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    pub auto_index: bool,
    pub show_dir: bool,
    pub default_ext: Option<&'a str>,
}

impl<'a> From<&'a ServerConfig> for ResolveOptions<'a> {
    fn from(cfg: &'a ServerConfig) -> Self {
        Self {
            auto_index: cfg.auto_index,
            show_dir: cfg.show_dir,
            default_ext: cfg.default_ext.as_deref(),
        }
    }
}

/// Maps a normalized request path onto the filesystem below `root`.
///
/// `root` must already be canonical. Containment is checked on canonical
/// filesystem paths, so symlinks pointing outside the root are refused.
pub async fn resolve_static_path(
    root: &Path,
    request: &RequestPath,
    opts: &ResolveOptions<'_>,
) -> Result<Resolved, ResolveError> {
    let candidate = root.join(request.relative_path());

    let Some(target) = canonicalize_within(root, &candidate).await? else {
        return resolve_with_extension(root, request, &candidate, opts).await;
    };

    let metadata = fs::metadata(&target).await.map_err(map_io_error)?;

    if metadata.is_file() {
        // `/a.txt/` names a directory that does not exist.
        if request.has_trailing_slash() {
            return Err(ResolveError::NotFound);
        }
        return Ok(Resolved::File(target));
    }

    if metadata.is_dir() {
        return resolve_directory(root, request, target, opts).await;
    }

    // Sockets, fifos and friends are never served.
    Err(ResolveError::NotFound)
}

async fn resolve_directory(
    root: &Path,
    request: &RequestPath,
    dir: PathBuf,
    opts: &ResolveOptions<'_>,
) -> Result<Resolved, ResolveError> {
    if opts.auto_index {
        if let Some(index) = existing_file(root, &dir.join(INDEX_FILE)).await? {
            return Ok(redirect_without_slash(request).unwrap_or(Resolved::File(index)));
        }
    }

    // `/docs` may also mean `/docs.html`.
    if let Some(ext) = opts.default_ext {
        if !request.is_root() {
            if let Some(sibling) = existing_file(root, &with_extension(&dir, ext)).await? {
                return Ok(Resolved::File(sibling));
            }
        }
    }

    if opts.show_dir {
        return Ok(redirect_without_slash(request).unwrap_or(Resolved::Directory(dir)));
    }

    Err(ResolveError::NotFound)
}

async fn resolve_with_extension(
    root: &Path,
    request: &RequestPath,
    candidate: &Path,
    opts: &ResolveOptions<'_>,
) -> Result<Resolved, ResolveError> {
    let Some(ext) = opts.default_ext else {
        return Err(ResolveError::NotFound);
    };

    let extensionless = request
        .last_segment()
        .map(|s| Path::new(s).extension().is_none())
        .unwrap_or(false);

    if !extensionless || request.has_trailing_slash() {
        return Err(ResolveError::NotFound);
    }

    match existing_file(root, &with_extension(candidate, ext)).await? {
        Some(file) => Ok(Resolved::File(file)),
        None => Err(ResolveError::NotFound),
    }
}

fn redirect_without_slash(request: &RequestPath) -> Option<Resolved> {
    if request.is_root() || request.has_trailing_slash() {
        return None;
    }
    Some(Resolved::Redirect(request.with_trailing_slash().to_uri_path()))
}

/// Canonicalizes `path` and enforces containment in `root`.
///
/// `Ok(None)` means nothing exists there.
async fn canonicalize_within(root: &Path, path: &Path) -> Result<Option<PathBuf>, ResolveError> {
    match fs::canonicalize(path).await {
        Ok(canonical) => {
            if canonical.starts_with(root) {
                Ok(Some(canonical))
            } else {
                tracing::debug!(path = %path.display(), "resolved path escapes document root");
                Err(ResolveError::Forbidden)
            }
        }
        Err(err) => match err.kind() {
            ErrorKind::PermissionDenied => Err(ResolveError::Forbidden),
            ErrorKind::InvalidInput => Err(ResolveError::BadPath),
            _ => Ok(None),
        },
    }
}

/// Canonical path of `path` when it is a regular file inside `root`.
async fn existing_file(root: &Path, path: &Path) -> Result<Option<PathBuf>, ResolveError> {
    let Some(canonical) = canonicalize_within(root, path).await? else {
        return Ok(None);
    };

    match fs::metadata(&canonical).await {
        Ok(m) if m.is_file() => Ok(Some(canonical)),
        Ok(_) => Ok(None),
        Err(err) => match map_io_error(err) {
            ResolveError::NotFound => Ok(None),
            other => Err(other),
        },
    }
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

fn map_io_error(err: std::io::Error) -> ResolveError {
    match err.kind() {
        ErrorKind::PermissionDenied => ResolveError::Forbidden,
        _ => ResolveError::NotFound,
    }
}
