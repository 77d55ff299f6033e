use crate::ctx::normalization::{PathRejection, RequestPath, normalize_path};
use crate::logging::display_ip;
use http::{HeaderMap, Method, Uri, header};
use pingora::prelude::Session;
use pingora::protocols::l4::socket::SocketAddr as PingoraSocketAddr;
use std::time::Instant;

/// How the dispatcher disposed of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Pending,
    /// Answered by the engine itself.
    Local,
    /// Relayed to the proxy target.
    Proxied,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Pending => "pending",
            Disposition::Local => "local",
            Disposition::Proxied => "proxied",
        }
    }
}

/// Per-request state carried through the pingora hooks.
#[derive(Debug)]
pub struct RequestCtx {
    pub started: Instant,

    /// Lifecycle flag to catch double hydration.
    pub hydrated: bool,

    pub method: Option<Method>,

    /// Raw URI path as received.
    pub raw_path: String,

    /// Raw query string, if any.
    pub query: Option<String>,

    /// Decoded, normalized path (or the reason it could not be normalized).
    pub path: Result<RequestPath, PathRejection>,

    /// Remote IP of the TCP connection.
    pub client_ip: Option<String>,

    pub user_agent: Option<String>,

    pub disposition: Disposition,

    /// Human-readable failure attached to the request record.
    pub error: Option<String>,
}

impl RequestCtx {
    pub fn empty() -> Self {
        Self {
            started: Instant::now(),
            hydrated: false,
            method: None,
            raw_path: String::new(),
            query: None,
            path: Ok(RequestPath::default()),
            client_ip: None,
            user_agent: None,
            disposition: Disposition::Pending,
            error: None,
        }
    }

    /// Create a boundary to decouple session from logic.
    pub fn hydrate_from_session(&mut self, session: &Session) {
        let request_header = session.req_header();

        let client_ip = match session.client_addr() {
            Some(PingoraSocketAddr::Inet(addr)) => Some(display_ip(addr.ip())),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        self.hydrate(
            &request_header.uri,
            &request_header.method,
            &request_header.headers,
            client_ip,
        );
    }

    pub(crate) fn hydrate(
        &mut self,
        uri: &Uri,
        method: &Method,
        headers: &HeaderMap,
        client_ip: Option<String>,
    ) {
        debug_assert!(!self.hydrated, "Already hydrated, cannot hydrate again");

        self.method = Some(method.clone());
        self.raw_path = uri.path().to_string();
        self.query = uri.query().map(str::to_string);
        self.path = normalize_path(uri.path());
        self.client_ip = client_ip;
        self.user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.hydrated = true;
    }

    pub fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    pub fn is_head(&self) -> bool {
        self.method.as_ref() == Some(&Method::HEAD)
    }

    /// Path and query exactly as the client sent them.
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.raw_path, q),
            None => self.raw_path.clone(),
        }
    }

    pub fn fail(&mut self, description: impl Into<String>) {
        self.error = Some(description.into());
    }
}
