use http::{Uri, header};
use pingora::prelude::*;
use pingora_http::RequestHeader;

use crate::conf::ProxyTarget;

/// Builds the upstream peer for the proxy target, with bounded timeouts.
pub(crate) async fn upstream_peer(target: &ProxyTarget) -> Result<Box<HttpPeer>> {
    let peer_addr = target.peer_addr();
    let addr = tokio::net::lookup_host(&peer_addr)
        .await
        .map_err(|e| Error::because(ConnectNoRoute, format!("resolving {peer_addr}"), e))?
        .next()
        .ok_or_else(|| Error::explain(ConnectNoRoute, format!("no address for {peer_addr}")))?;

    let mut peer = HttpPeer::new(addr, target.use_tls, target.sni());
    peer.options.connection_timeout = Some(target.connect_timeout());
    peer.options.read_timeout = Some(target.timeout);
    peer.options.write_timeout = Some(target.timeout);

    Ok(Box::new(peer))
}

/// Points the forwarded request at the target: `Host` becomes the target
/// authority and the target's path prefix is prepended.
pub(crate) fn rewrite_upstream_request(
    upstream: &mut RequestHeader,
    target: &ProxyTarget,
    path_and_query: &str,
) -> Result<()> {
    let uri: Uri = target
        .upstream_uri(path_and_query)
        .parse()
        .map_err(|e| Error::because(InvalidHTTPHeader, "invalid upstream uri", e))?;

    upstream.set_uri(uri);
    upstream.insert_header(header::HOST, target.authority())?;
    Ok(())
}
