use crate::proxy::Gateway;
use crate::server::Server;
use anyhow::{Error, Result};
use pingora::prelude::*;
use pingora::server::Server as PingoraServer;
use pingora::server::configuration::ServerConf;
use std::net::SocketAddr;

/// Build the Pingora server for `server`, listening on `addr`.
pub fn build_pingora_server(server: &Server, addr: SocketAddr) -> Result<PingoraServer, Error> {
    let config = server.config();

    let mut pingora = if let Some(threads) = config.threads {
        tracing::debug!(
            threads,
            "Creating Pingora server with overridden worker threads"
        );
        let mut conf = ServerConf::new()
            .ok_or_else(|| anyhow::anyhow!("could not construct pingora server configuration"))?;
        conf.threads = threads;
        PingoraServer::new_with_opt_and_conf(None, conf)
    } else {
        // "None" is required here to truly tell Pingora to use its default settings.
        PingoraServer::new(None)?
    };

    pingora.bootstrap();

    let gateway = Gateway::new(server.shared_config(), server.logger());

    let listen = addr.to_string();
    let mut svc = http_proxy_service(&pingora.configuration, gateway);
    if let Some(tls) = &config.tls {
        svc.add_tls(
            &listen,
            &tls.cert.to_string_lossy(),
            &tls.key.to_string_lossy(),
        )?;
    } else {
        svc.add_tcp(&listen);
    }

    pingora.add_service(svc);

    Ok(pingora)
}
