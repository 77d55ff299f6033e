use crate::conf::CorsPolicy;
use http::{HeaderName, HeaderValue, header};

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers attached to every response when CORS is enabled.
pub fn cors_headers(policy: &CorsPolicy) -> Vec<(HeaderName, HeaderValue)> {
    let CorsPolicy::AllowAny { allow_headers } = policy else {
        return Vec::new();
    };

    let mut out = vec![(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    )];

    if let Some(list) = allow_headers {
        out.push((header::ACCESS_CONTROL_ALLOW_HEADERS, list.clone()));
    }

    out
}

/// Additional headers for a preflight (`OPTIONS`) answer.
pub fn preflight_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ),
        (header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS)),
    ]
}
