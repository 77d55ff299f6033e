use bytes::BytesMut;
use pingora::prelude::*;
use tokio::io::AsyncReadExt;

use crate::conf::ServerConfig;
use crate::ctx::{RequestCtx, RequestPath};
use crate::proxy::respond::build_header;
use crate::static_files::{
    ConditionalHeaders, StaticBody, StaticOutcome, StaticResponse, handle_static_request,
};

const CHUNK_SIZE: usize = 32 * 1024;

pub struct StaticFileHandler;

impl StaticFileHandler {
    /// Serves `path` from disk. Returns `Ok(false)` when nothing on disk
    /// answers the path, leaving the decision to the caller.
    pub async fn handle(
        &self,
        session: &mut Session,
        ctx: &mut RequestCtx,
        path: &RequestPath,
        config: &ServerConfig,
    ) -> Result<bool> {
        let conditional = ConditionalHeaders::from_headers(&session.req_header().headers);

        let outcome =
            handle_static_request(config, path, ctx.query.as_deref(), &conditional).await;

        let StaticOutcome::Response(static_resp) = outcome else {
            return Ok(false);
        };

        if static_resp.status.is_client_error() || static_resp.status.is_server_error() {
            ctx.fail(format!("static: {}", static_resp.status));
        }

        write_static_response(session, static_resp, config, ctx.is_head()).await?;
        Ok(true)
    }
}

async fn write_static_response(
    session: &mut Session,
    static_resp: StaticResponse,
    config: &ServerConfig,
    head_only: bool,
) -> Result<()> {
    let resp = build_header(static_resp.status, &static_resp.headers, &config.cors)?;

    let no_body = head_only || matches!(static_resp.body, StaticBody::Empty);
    session.write_response_header(Box::new(resp), no_body).await?;
    if no_body {
        return Ok(());
    }

    match static_resp.body {
        StaticBody::Empty => {}

        StaticBody::Bytes(bytes) => {
            session.write_response_body(Some(bytes), true).await?;
        }

        StaticBody::RangedFile {
            mut file,
            mut remaining,
        } => {
            // Allocate once per request.
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);

            while remaining > 0 {
                let to_read = std::cmp::min(CHUNK_SIZE as u64, remaining) as usize;
                buf.resize(to_read, 0);

                let n = file
                    .read(&mut buf[..])
                    .await
                    .map_err(|e| Error::because(InternalError, "static file read error", e))?;

                // The file shrank underneath us.
                if n == 0 {
                    break;
                }

                remaining -= n as u64;
                buf.truncate(n);

                session
                    .write_response_body(Some(buf.split().freeze()), false)
                    .await?;
            }

            session.write_response_body(None, true).await?;
        }
    }

    Ok(())
}
