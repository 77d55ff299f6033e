use pingora::{ErrorSource, ErrorType};

/// What went wrong when a request could not be completed through the
/// normal pingora flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProxyFailure {
    /// The client went away; nothing can be written.
    ClientGone,
    /// The downstream request could not be parsed.
    BadRequest,
    /// Connect, TLS or protocol failure talking to the proxy target.
    UpstreamUnavailable,
    UpstreamTimeout,
    /// An explicit status raised by a hook.
    Status(u16),
    Internal,
}

impl ProxyFailure {
    /// Status code to send downstream; `0` means send nothing.
    pub(crate) fn status(&self) -> u16 {
        match self {
            ProxyFailure::ClientGone => 0,
            ProxyFailure::BadRequest => 400,
            ProxyFailure::UpstreamUnavailable => 502,
            ProxyFailure::UpstreamTimeout => 504,
            ProxyFailure::Status(code) => *code,
            ProxyFailure::Internal => 500,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            ProxyFailure::ClientGone => "client disconnected",
            ProxyFailure::BadRequest => "bad request",
            ProxyFailure::UpstreamUnavailable => "upstream unavailable",
            ProxyFailure::UpstreamTimeout => "upstream timed out",
            ProxyFailure::Status(_) => "request rejected",
            ProxyFailure::Internal => "internal error",
        }
    }
}

pub(crate) fn classify_pingora_error(err: &pingora::Error) -> ProxyFailure {
    use ErrorType::*;

    if let HTTPStatus(code) = err.etype() {
        return ProxyFailure::Status(*code);
    }

    match err.esource() {
        ErrorSource::Downstream => match err.etype() {
            ReadError | WriteError | ConnectionClosed | ReadTimedout | WriteTimedout => {
                ProxyFailure::ClientGone
            }
            _ => ProxyFailure::BadRequest,
        },
        ErrorSource::Upstream => {
            classify_upstream(err.etype()).unwrap_or(ProxyFailure::UpstreamUnavailable)
        }
        // Peer selection errors are raised before pingora tags a source.
        _ => classify_upstream(err.etype()).unwrap_or(ProxyFailure::Internal),
    }
}

fn classify_upstream(etype: &ErrorType) -> Option<ProxyFailure> {
    use ErrorType::*;

    match etype {
        ConnectTimedout | ReadTimedout | WriteTimedout | TLSHandshakeTimedout => {
            Some(ProxyFailure::UpstreamTimeout)
        }

        ConnectRefused | ConnectNoRoute | ConnectProxyFailure | ConnectError
        | TLSHandshakeFailure | InvalidCert | HandshakeError | InvalidHTTPHeader | H1Error
        | H2Error | InvalidH2 | ReadError | WriteError | ConnectionClosed => {
            Some(ProxyFailure::UpstreamUnavailable)
        }

        _ => None,
    }
}
