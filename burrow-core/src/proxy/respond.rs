use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use pingora::prelude::*;
use pingora_http::ResponseHeader;

use crate::access::{BASIC_CHALLENGE, ROBOTS_BODY};
use crate::conf::CorsPolicy;
use crate::cors::{ALLOWED_METHODS, cors_headers, preflight_headers};

/// Builds the downstream response header, adding CORS headers when enabled.
pub(crate) fn build_header(
    status: StatusCode,
    headers: &HeaderMap,
    cors: &CorsPolicy,
) -> Result<ResponseHeader> {
    let mut resp = ResponseHeader::build(status, Some(headers.len() + 2))?;

    for (name, value) in headers.iter() {
        resp.insert_header(name.clone(), value.clone())?;
    }
    for (name, value) in cors_headers(cors) {
        resp.insert_header(name, value)?;
    }

    Ok(resp)
}

/// Writes a complete in-memory response. `head_only` suppresses the body
/// but keeps `Content-Length`.
pub(crate) async fn write_simple(
    session: &mut Session,
    cors: &CorsPolicy,
    status: StatusCode,
    mut headers: HeaderMap,
    body: Bytes,
    head_only: bool,
) -> Result<()> {
    if status != StatusCode::NO_CONTENT && status != StatusCode::NOT_MODIFIED {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    }

    let resp = build_header(status, &headers, cors)?;
    let end = head_only || body.is_empty();
    session.write_response_header(Box::new(resp), end).await?;

    if !end {
        session.write_response_body(Some(body), true).await?;
    }
    Ok(())
}

pub(crate) async fn status_only(
    session: &mut Session,
    cors: &CorsPolicy,
    status: StatusCode,
    head_only: bool,
) -> Result<()> {
    write_simple(session, cors, status, HeaderMap::new(), Bytes::new(), head_only).await
}

pub(crate) async fn unauthorized(
    session: &mut Session,
    cors: &CorsPolicy,
    head_only: bool,
) -> Result<()> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(BASIC_CHALLENGE),
    );
    write_simple(
        session,
        cors,
        StatusCode::UNAUTHORIZED,
        headers,
        Bytes::new(),
        head_only,
    )
    .await
}

pub(crate) async fn method_not_allowed(session: &mut Session, cors: &CorsPolicy) -> Result<()> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    write_simple(
        session,
        cors,
        StatusCode::METHOD_NOT_ALLOWED,
        headers,
        Bytes::new(),
        false,
    )
    .await
}

pub(crate) async fn preflight(session: &mut Session, cors: &CorsPolicy) -> Result<()> {
    let mut headers = HeaderMap::new();
    for (name, value) in preflight_headers() {
        headers.insert(name, value);
    }
    write_simple(
        session,
        cors,
        StatusCode::NO_CONTENT,
        headers,
        Bytes::new(),
        false,
    )
    .await
}

pub(crate) async fn robots(
    session: &mut Session,
    cors: &CorsPolicy,
    head_only: bool,
) -> Result<()> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    write_simple(
        session,
        cors,
        StatusCode::OK,
        headers,
        Bytes::from_static(ROBOTS_BODY.as_bytes()),
        head_only,
    )
    .await
}
