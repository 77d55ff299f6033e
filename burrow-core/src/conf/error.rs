use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    // IO / Discovery
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parsing
    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // Document root
    #[error("invalid document root {path}: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document root {path} is not a directory")]
    RootNotDirectory { path: PathBuf },

    // TLS
    #[error("unreadable TLS file {path}: {source}")]
    TlsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Options
    #[error("invalid proxy target '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("invalid default extension '{ext}'")]
    InvalidExtension { ext: String },

    #[error("invalid CORS header list '{headers}'")]
    InvalidCorsHeaders { headers: String },

    #[error("invalid default content type '{value}'")]
    InvalidContentType { value: String },

    // Listener
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_proxy(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProxy {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
