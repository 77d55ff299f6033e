//! Public entry point: build a [`Server`] from options, then listen.

mod setup;


pub use setup::build_pingora_server;

use crate::conf::{ConfigError, ServerConfig, ServerOptions};
use crate::logging::RequestLogger;
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::Arc;

/// A configured, not yet listening, static file server.
pub struct Server {
    config: Arc<ServerConfig>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl Server {
    /// Validates `options` and resolves them (including credentials from the
    /// environment) into the runtime configuration.
    pub fn create(options: ServerOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_config(ServerConfig::from_options(options)?))
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            logger: None,
        }
    }

    /// Installs the per-request logger.
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Canonical, absolute document root.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub(crate) fn logger(&self) -> Option<Arc<dyn RequestLogger>> {
        self.logger.clone()
    }

    /// Binds `host:port`, reports the bound address to `on_ready` and serves
    /// until the process is terminated.
    ///
    /// Port `0` picks a free port; the chosen address is what `on_ready` sees.
    pub fn listen(
        self,
        port: u16,
        host: &str,
        on_ready: impl FnOnce(SocketAddr),
    ) -> anyhow::Result<()> {
        let addr = check_bind(host, port)?;
        let server = build_pingora_server(&self, addr)?;

        tracing::info!(
            %addr,
            root = %self.root().display(),
            tls = self.config.tls.is_some(),
            proxy = ?self.config.proxy.as_ref().map(|p| p.peer_addr()),
            "burrow listening"
        );
        on_ready(addr);

        server.run_forever()
    }
}

/// Confirms the address can be bound before handing it to pingora, which
/// would otherwise only fail inside its own runtime.
pub(crate) fn check_bind(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let display = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };

    let listener = TcpListener::bind(display.as_str()).map_err(|source| ConfigError::Bind {
        addr: display.clone(),
        source,
    })?;

    listener.local_addr().map_err(|source| ConfigError::Bind {
        addr: display,
        source,
    })
}
