mod error;
mod loader;
mod lower;
mod runtime;
mod types;


pub use error::ConfigError;
pub use lower::{PASSWORD_ENV, USERNAME_ENV};
pub use runtime::{
    CachePolicy, CompressionConfig, CorsPolicy, Credentials, ProxyTarget, ServerConfig, TlsConfig,
};
pub use types::{CorsSpec, HttpsSpec, ServerOptions};
