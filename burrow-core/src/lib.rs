pub mod access;
pub mod conf;
pub mod cors;
pub mod ctx;
pub mod logging;
mod proxy;
pub mod server;
pub mod static_files;

pub use conf::{ConfigError, ServerOptions};
pub use logging::{AccessLogEntry, RequestLogger, TracingRequestLogger};
pub use server::Server;
