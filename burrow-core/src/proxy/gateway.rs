use crate::access::{AccessDecision, check_access};
use crate::conf::ServerConfig;
use crate::cors::cors_headers;
use crate::ctx::{Disposition, PathRejection, RequestCtx, RequestPath};
use crate::logging::{AccessLogEntry, RequestLogger};
use crate::proxy::error_classification::classify_pingora_error;
use crate::proxy::fallback::{rewrite_upstream_request, upstream_peer};
use crate::proxy::handlers::StaticFileHandler;
use crate::proxy::respond;
use async_trait::async_trait;
use http::{Method, StatusCode, header};
use pingora::prelude::*;
use pingora::proxy::FailToProxy;
use pingora_http::{RequestHeader, ResponseHeader};
use std::sync::Arc;

/// Gateway is the per-request orchestration for burrow.
/// It wraps the pingora hooks: local answers end in `request_filter`,
/// everything else flows to the proxy target.
pub struct Gateway {
    config: Arc<ServerConfig>,
    logger: Option<Arc<dyn RequestLogger>>,

    // Handlers
    static_file_handler: StaticFileHandler,
}

impl Gateway {
    pub fn new(config: Arc<ServerConfig>, logger: Option<Arc<dyn RequestLogger>>) -> Self {
        Self {
            config,
            logger,
            static_file_handler: StaticFileHandler,
        }
    }
}

/// Pingora hook execution order in ProxyHttp, as used here:
///
/// 1. new_ctx()
///    - Allocate empty RequestCtx
///
/// 2. request_filter()
///    - Hydrate ctx from Session
///    - Authentication, preflight, robots, dotfiles, path rejection, method gate
///    - Static responses end here
///
/// 3. upstream_peer()
///    - Resolve the proxy target and apply timeouts
///
/// 4. upstream_request_filter()
///    - Rewrite URI and Host for the target
///
/// 5. [Pingora upstream I/O]
///
/// 6. response_filter()
///    - Attach CORS headers to relayed responses
///
/// fail_to_proxy() runs instead of 5-6 when anything above errors.
///
/// 7. logging()   /// ALWAYS LAST
///    - Hand the request record to the injected logger
#[async_trait]
impl ProxyHttp for Gateway {
    type CTX = RequestCtx;

    fn new_ctx(&self) -> Self::CTX {
        RequestCtx::empty()
    }

    async fn upstream_peer(
        &self,
        _session: &mut Session,
        ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        let target = self
            .config
            .proxy
            .as_ref()
            .ok_or_else(|| Error::explain(InternalError, "no proxy target configured"))?;

        ctx.disposition = Disposition::Proxied;
        upstream_peer(target).await
    }

    /// ACCEPT → GUARD → (RESPOND | PROXY)
    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        // The request ctx exists before now, but has no data.
        ctx.hydrate_from_session(session);

        let cfg = &self.config;
        let method = ctx.method();
        let head_only = ctx.is_head();

        // Rejected paths still go through authentication first; the empty
        // path is never robots.txt or hidden.
        let guard_path = ctx.path.as_ref().cloned().unwrap_or_default();
        let authorization = session
            .req_header()
            .headers
            .get(header::AUTHORIZATION)
            .cloned();

        let decision = check_access(cfg, &guard_path, authorization.as_ref());

        if decision == AccessDecision::Unauthorized {
            ctx.fail("unauthorized");
            respond::unauthorized(session, &cfg.cors, head_only).await?;
            return answered(ctx);
        }

        // Preflights carry credentials like any other request.
        if method == Method::OPTIONS && cfg.cors.is_enabled() {
            respond::preflight(session, &cfg.cors).await?;
            return answered(ctx);
        }

        match decision {
            AccessDecision::Allow | AccessDecision::Unauthorized => {}
            AccessDecision::Robots if is_read(&method) => {
                respond::robots(session, &cfg.cors, head_only).await?;
                return answered(ctx);
            }
            AccessDecision::Robots => {}
            AccessDecision::Hidden => {
                ctx.fail("hidden path");
                respond::status_only(session, &cfg.cors, StatusCode::NOT_FOUND, head_only)
                    .await?;
                return answered(ctx);
            }
        }

        let path: RequestPath = match ctx.path.clone() {
            Ok(path) => path,
            Err(rejection) => {
                let status = match rejection {
                    PathRejection::Traversal => StatusCode::NOT_FOUND,
                    PathRejection::Malformed => StatusCode::BAD_REQUEST,
                };
                tracing::debug!(path = %ctx.raw_path, ?rejection, "rejected request path");
                ctx.fail(format!("rejected path: {rejection:?}"));
                respond::status_only(session, &cfg.cors, status, head_only).await?;
                return answered(ctx);
            }
        };

        if !is_read(&method) {
            if cfg.proxy.is_some() {
                return Ok(false);
            }
            ctx.fail("method not allowed");
            respond::method_not_allowed(session, &cfg.cors).await?;
            return answered(ctx);
        }

        let served = self
            .static_file_handler
            .handle(session, ctx, &path, cfg)
            .await?;

        if served {
            return answered(ctx);
        }
        if cfg.proxy.is_some() {
            return Ok(false);
        }

        ctx.fail("not found");
        respond::status_only(session, &cfg.cors, StatusCode::NOT_FOUND, head_only).await?;
        answered(ctx)
    }

    async fn upstream_request_filter(
        &self,
        _session: &mut Session,
        upstream: &mut RequestHeader,
        ctx: &mut Self::CTX,
    ) -> Result<()> {
        let Some(target) = self.config.proxy.as_ref() else {
            return Err(Error::explain(InternalError, "no proxy target configured"));
        };

        rewrite_upstream_request(upstream, target, &ctx.path_and_query())
    }

    async fn response_filter(
        &self,
        _session: &mut Session,
        upstream: &mut ResponseHeader,
        _ctx: &mut Self::CTX,
    ) -> Result<()> {
        for (name, value) in cors_headers(&self.config.cors) {
            upstream.insert_header(name, value)?;
        }
        Ok(())
    }

    async fn fail_to_proxy(
        &self,
        session: &mut Session,
        e: &Error,
        ctx: &mut Self::CTX,
    ) -> FailToProxy
    where
        Self::CTX: Send + Sync,
    {
        let failure = classify_pingora_error(e);
        let code = failure.status();

        tracing::warn!(
            path = %ctx.raw_path,
            status = code,
            error = %e,
            "{}",
            failure.label()
        );
        ctx.fail(format!("{}: {e}", failure.label()));

        // Nothing can be sent once the client is gone or a header went out.
        if code > 0 && session.response_written().is_none() {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if let Err(err) =
                respond::status_only(session, &self.config.cors, status, ctx.is_head()).await
            {
                tracing::debug!(error = %err, "failed to send error response downstream");
            }
        }

        FailToProxy {
            error_code: code,
            can_reuse_downstream: false,
        }
    }

    async fn logging(&self, session: &mut Session, e: Option<&Error>, ctx: &mut Self::CTX)
    where
        Self::CTX: Send + Sync,
    {
        if let Some(err) = e {
            if ctx.error.is_none() {
                ctx.fail(err.to_string());
            }
        }

        let Some(logger) = &self.logger else {
            return;
        };

        let status = session
            .response_written()
            .map(|resp| resp.status.as_u16())
            .unwrap_or(0);
        let path_and_query = ctx.path_and_query();

        logger.log(&AccessLogEntry {
            method: ctx.method.as_ref().map(Method::as_str).unwrap_or("-"),
            path: &path_and_query,
            status,
            client_addr: if self.config.log_ip {
                ctx.client_ip.as_deref()
            } else {
                None
            },
            user_agent: ctx.user_agent.as_deref(),
            elapsed: ctx.started.elapsed(),
            disposition: ctx.disposition,
            error: ctx.error.as_deref(),
        });
    }
}

/// Marks the request as answered locally; pingora skips the upstream.
fn answered(ctx: &mut RequestCtx) -> Result<bool> {
    ctx.disposition = Disposition::Local;
    Ok(true)
}

fn is_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}
