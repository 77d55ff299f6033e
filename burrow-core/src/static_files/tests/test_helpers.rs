use crate::conf::{ServerConfig, ServerOptions};
use crate::static_files::{StaticBody, StaticResponse};
use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Builds a runtime config rooted at `dir`, ignoring the process environment.
pub fn config(dir: &TempDir, tweak: impl FnOnce(&mut ServerOptions)) -> ServerConfig {
    let mut opts = ServerOptions {
        root: dir.path().to_path_buf(),
        ..ServerOptions::default()
    };
    tweak(&mut opts);
    ServerConfig::from_options_with_env(opts, |_| None).unwrap()
}

pub fn canonical_root(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

pub fn write(dir: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Moves the mtime of `path` by `offset_secs` relative to `base`.
pub fn set_mtime(path: &Path, base: SystemTime, offset_secs: i64) {
    let when = if offset_secs >= 0 {
        base + Duration::from_secs(offset_secs as u64)
    } else {
        base - Duration::from_secs(offset_secs.unsigned_abs())
    };
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(when)
        .unwrap();
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

pub fn header<'a>(resp: &'a StaticResponse, name: http::HeaderName) -> Option<&'a str> {
    resp.headers.get(name).and_then(|v| v.to_str().ok())
}

pub fn body_bytes(resp: StaticResponse) -> Bytes {
    match resp.body {
        StaticBody::Bytes(b) => b,
        StaticBody::Empty => Bytes::new(),
        other => panic!("Expected an in-memory body, got {:?}", other),
    }
}
