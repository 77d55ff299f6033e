use serde::Deserialize;
use std::path::PathBuf;

/// Caller-facing server options, as accepted by [`crate::server::Server::create`]
/// and by TOML config files.
///
/// Nothing here is validated; [`crate::conf::ServerConfig::from_options`] lowers
/// the options into the immutable runtime configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerOptions {
    /// Document root. Relative paths resolve against the working directory.
    pub root: PathBuf,

    /// `Cache-Control` max-age in seconds. Any negative value disables caching.
    pub cache: i64,

    /// Render a listing for directories without an index file.
    pub show_dir: bool,

    /// Serve `index.html` when a directory is requested.
    pub auto_index: bool,

    /// Serve gzip representations.
    pub gzip: bool,

    /// Serve brotli representations. Takes precedence over gzip.
    pub brotli: bool,

    /// Compress small compressible files in memory when no pre-compressed
    /// sibling exists.
    pub compress: bool,

    /// Default extension tried for extensionless paths (e.g. `html`).
    pub ext: Option<String>,

    /// Answer `/robots.txt` with a disallow-all body.
    pub robots: bool,

    /// Serve and list files whose name starts with a dot.
    pub show_dotfiles: bool,

    pub cors: CorsSpec,

    /// Upstream origin for requests that cannot be resolved on disk.
    pub proxy: Option<String>,

    /// Upstream read/write timeout in seconds.
    pub proxy_timeout: u64,

    pub username: Option<String>,
    pub password: Option<String>,

    pub https: Option<HttpsSpec>,

    /// Include the client address in request records.
    pub log_ip: bool,

    /// Worker threads for the listening service.
    pub threads: Option<usize>,

    /// Content type used when none can be guessed from the file name.
    pub default_content_type: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            cache: 3600,
            show_dir: true,
            auto_index: true,
            gzip: false,
            brotli: false,
            compress: false,
            ext: None,
            robots: false,
            show_dotfiles: false,
            cors: CorsSpec::default(),
            proxy: None,
            proxy_timeout: 30,
            username: None,
            password: None,
            https: None,
            log_ip: false,
            threads: None,
            default_content_type: "application/octet-stream".to_string(),
        }
    }
}

/// `cors = true` enables CORS; `cors = "X-Foo, X-Bar"` enables it and sets the
/// allowed request headers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CorsSpec {
    Enabled(bool),
    Headers(String),
}

impl Default for CorsSpec {
    fn default() -> Self {
        CorsSpec::Enabled(false)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HttpsSpec {
    pub cert: PathBuf,
    pub key: PathBuf,
}
