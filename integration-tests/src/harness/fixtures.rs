use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Larger than the in-memory threshold, so it is streamed from disk.
pub const BIG_FILE_LEN: usize = 300 * 1024;

pub const INDEX_HTML: &str = "<!doctype html><h1>burrow fixture</h1>\n";
pub const A_TXT: &str = "alpha bravo charlie\n";
pub const APP_JS: &str = "export const answer = () => 42;\n";
pub const OUTSIDE_TXT: &str = "outside the document root\n";

/// Document root used by every integration test:
///
/// ```text
/// root/
///   index.html
///   app.js, app.js.gz
///   big.bin
///   .secret
///   docs/a.txt
///   docs/.hidden
///   escape -> outside/   (unix only)
/// outside/
///   outside.txt
/// ```
pub struct Fixtures {
    root: TempDir,
    outside: TempDir,
}

impl Fixtures {
    pub fn create() -> Self {
        let root = TempDir::new().expect("failed to create document root");
        let outside = TempDir::new().expect("failed to create outside dir");

        write(root.path(), "index.html", INDEX_HTML.as_bytes());
        write(root.path(), "app.js", APP_JS.as_bytes());
        // The sibling is written after its source so its mtime is never older.
        write(root.path(), "app.js.gz", &gzip(APP_JS.as_bytes()));
        write(root.path(), "big.bin", &big_body());
        write(root.path(), ".secret", b"top secret\n");
        write(root.path(), "docs/a.txt", A_TXT.as_bytes());
        write(root.path(), "docs/.hidden", b"hidden\n");

        write(outside.path(), "outside.txt", OUTSIDE_TXT.as_bytes());

        #[cfg(unix)]
        std::os::unix::fs::symlink(outside.path(), root.path().join("escape"))
            .expect("failed to create escape symlink");

        Self { root, outside }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn outside(&self) -> &Path {
        self.outside.path()
    }
}

/// Deterministic content of `big.bin`.
pub fn big_body() -> Vec<u8> {
    (0..BIG_FILE_LEN).map(|i| (i % 251) as u8).collect()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

fn write(dir: &Path, rel: &str, contents: &[u8]) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    fs::write(&path, contents).expect("failed to write fixture");
}
