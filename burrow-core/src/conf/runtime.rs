use http::HeaderValue;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable runtime configuration shared by every request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Canonical, absolute document root.
    pub root: PathBuf,
    pub cache: CachePolicy,
    pub show_dir: bool,
    pub auto_index: bool,
    pub compression: CompressionConfig,
    /// Default extension without the leading dot.
    pub default_ext: Option<String>,
    pub robots: bool,
    pub show_dotfiles: bool,
    pub cors: CorsPolicy,
    pub proxy: Option<ProxyTarget>,
    pub credentials: Option<Credentials>,
    pub tls: Option<TlsConfig>,
    pub log_ip: bool,
    pub threads: Option<usize>,
    pub default_content_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    MaxAge(u32),
    Disabled,
}

impl CachePolicy {
    pub fn from_seconds(seconds: i64) -> Self {
        if seconds < 0 {
            CachePolicy::Disabled
        } else {
            CachePolicy::MaxAge(u32::try_from(seconds).unwrap_or(u32::MAX))
        }
    }

    pub fn header_value(&self) -> String {
        match self {
            CachePolicy::MaxAge(seconds) => format!("max-age={seconds}"),
            CachePolicy::Disabled => "no-cache, no-store, must-revalidate".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub enable_gzip: bool,
    pub enable_brotli: bool,
    pub on_the_fly: bool,
    pub small_file_threshold: u64,
    pub min_compress_size: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enable_gzip: false,
            enable_brotli: false,
            on_the_fly: false,
            small_file_threshold: 256 * 1024, // 256 KiB
            min_compress_size: 1024,          // 1 KiB
        }
    }
}

impl CompressionConfig {
    pub fn any_enabled(&self) -> bool {
        self.enable_gzip || self.enable_brotli
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    Disabled,
    AllowAny {
        allow_headers: Option<HeaderValue>,
    },
}

impl CorsPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CorsPolicy::AllowAny { .. })
    }
}

/// Basic-auth credentials. Either half may be empty when only one was given.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Upstream origin used by the proxy fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub use_tls: bool,
    pub host: String,
    pub port: u16,
    /// Path prefix from the target URL, without a trailing slash. Empty for `/`.
    pub base_path: String,
    pub timeout: Duration,
}

impl ProxyTarget {
    /// Socket address in `host:port` form.
    pub fn peer_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Value for the upstream `Host` header.
    pub fn authority(&self) -> String {
        let default_port = if self.use_tls { 443 } else { 80 };
        if self.port == default_port {
            self.host.clone()
        } else {
            self.peer_addr()
        }
    }

    /// Server name for TLS upstreams (brackets stripped from IPv6 literals).
    pub fn sni(&self) -> String {
        self.host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string()
    }

    /// Joins the target's path prefix with the downstream path and query.
    pub fn upstream_uri(&self, path_and_query: &str) -> String {
        if self.base_path.is_empty() {
            path_and_query.to_string()
        } else {
            format!("{}{}", self.base_path, path_and_query)
        }
    }

    /// Upper bound for establishing the upstream connection.
    pub fn connect_timeout(&self) -> Duration {
        self.timeout.min(Duration::from_secs(5))
    }
}
