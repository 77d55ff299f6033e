use http::StatusCode;

use crate::conf::ServerConfig;
use crate::ctx::RequestPath;
use crate::static_files::render::headers::HeaderBuilder;
use crate::static_files::render::{render_directory, render_file};
use crate::static_files::resolve::{ResolveError, ResolveOptions, Resolved, resolve_static_path};
use crate::static_files::{ConditionalHeaders, ServeError, StaticResponse};

#[derive(Debug)]
pub enum StaticOutcome {
    Response(StaticResponse),
    /// Nothing on disk answers this path; the proxy fallback may take it.
    Unresolved,
}

pub async fn handle_static_request(
    config: &ServerConfig,
    request_path: &RequestPath,
    query: Option<&str>,
    conditional: &ConditionalHeaders,
) -> StaticOutcome {
    let opts = ResolveOptions::from(config);

    let resolved = match resolve_static_path(&config.root, request_path, &opts).await {
        Ok(resolved) => resolved,
        Err(ResolveError::NotFound) => return StaticOutcome::Unresolved,
        Err(err) => return StaticOutcome::Response(error_response(map_resolve_error(err))),
    };

    let rendered = match resolved {
        Resolved::File(path) => render_file(&path, conditional, config).await,
        Resolved::Directory(dir) => {
            render_directory(&dir, request_path, config.show_dotfiles).await
        }
        Resolved::Redirect(location) => Ok(redirect_response(&location, query)),
    };

    match rendered {
        Ok(response) => StaticOutcome::Response(response),
        Err(ServeError::Io(err)) => {
            tracing::error!(
                error = %err,
                path = %request_path.display(),
                "failed to read static file"
            );
            StaticOutcome::Response(error_response(StatusCode::INTERNAL_SERVER_ERROR))
        }
        Err(err) => StaticOutcome::Response(error_response(map_serve_error(&err))),
    }
}

/// Forbidden paths are reported as missing so their existence does not leak.
fn map_resolve_error(err: ResolveError) -> StatusCode {
    match err {
        ResolveError::NotFound | ResolveError::Forbidden => StatusCode::NOT_FOUND,
        ResolveError::BadPath => StatusCode::BAD_REQUEST,
    }
}

fn map_serve_error(err: &ServeError) -> StatusCode {
    match err {
        ServeError::NotFound | ServeError::Forbidden => StatusCode::NOT_FOUND,
        ServeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redirect_response(location: &str, query: Option<&str>) -> StaticResponse {
    let target = match query {
        Some(q) if !q.is_empty() => format!("{location}?{q}"),
        _ => location.to_string(),
    };

    let mut headers = HeaderBuilder::default();
    headers.location(&target);
    headers.content_length(0);
    StaticResponse::empty(StatusCode::MOVED_PERMANENTLY, headers.build())
}

pub(crate) fn error_response(status: StatusCode) -> StaticResponse {
    let mut headers = HeaderBuilder::default();
    headers.content_length(0);
    StaticResponse::empty(status, headers.build())
}
