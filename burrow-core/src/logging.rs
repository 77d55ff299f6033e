use crate::ctx::Disposition;
use std::io::{self, IsTerminal};
use std::net::IpAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the process-wide `tracing` subscriber.
///
/// Filtering comes from `RUST_LOG` (defaults to "info"). Output is JSON with
/// flattened event fields when stdout is not a terminal, and compact
/// human-readable lines otherwise.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match default_log_mode() {
        LogMode::Raw => fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .init(),
        LogMode::Pretty => fmt().with_env_filter(filter).compact().init(),
    }
}

pub fn default_log_mode() -> LogMode {
    if io::stdout().is_terminal() {
        LogMode::Pretty
    } else {
        LogMode::Raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Raw,
    Pretty,
}

/// One finished request, as handed to a [`RequestLogger`].
#[derive(Debug, Clone)]
pub struct AccessLogEntry<'a> {
    pub method: &'a str,
    /// Path and query as received.
    pub path: &'a str,
    /// Status sent downstream; `0` when nothing could be written.
    pub status: u16,
    /// Only populated when the server was configured with `log_ip`.
    pub client_addr: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub elapsed: Duration,
    /// Whether the request was answered locally or relayed upstream.
    pub disposition: Disposition,
    pub error: Option<&'a str>,
}

/// Receives one record per request. Injected into the server; called from
/// request tasks concurrently.
pub trait RequestLogger: Send + Sync {
    fn log(&self, entry: &AccessLogEntry<'_>);
}

/// Default logger: one `tracing` event per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRequestLogger;

impl RequestLogger for TracingRequestLogger {
    fn log(&self, entry: &AccessLogEntry<'_>) {
        let elapsed_ms = entry.elapsed.as_secs_f64() * 1000.0;

        match entry.error {
            Some(error) => tracing::warn!(
                method = entry.method,
                path = entry.path,
                status = entry.status,
                client_addr = entry.client_addr,
                user_agent = entry.user_agent,
                elapsed_ms,
                disposition = entry.disposition.as_str(),
                error,
                "request failed"
            ),
            None => tracing::info!(
                method = entry.method,
                path = entry.path,
                status = entry.status,
                client_addr = entry.client_addr,
                user_agent = entry.user_agent,
                elapsed_ms,
                disposition = entry.disposition.as_str(),
                "request"
            ),
        }
    }
}

/// Strips IPv4-mapped IPv6 prefixes so logs show `127.0.0.1`, not `::ffff:127.0.0.1`.
pub(crate) fn display_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        IpAddr::V4(v4) => v4.to_string(),
    }
}
