use crate::conf::Credentials;
use base64::{Engine as _, engine::general_purpose};
use http::HeaderValue;

/// Value of the `WWW-Authenticate` challenge sent with every 401.
pub const BASIC_CHALLENGE: &str = "Basic realm=\"burrow\", charset=\"UTF-8\"";

/// Checks an `Authorization` header against the configured credentials.
pub fn is_authorized(credentials: &Credentials, authorization: Option<&HeaderValue>) -> bool {
    let Some((username, password)) = authorization
        .and_then(|v| v.to_str().ok())
        .and_then(decode_basic)
    else {
        return false;
    };

    // Evaluate both halves so timing does not reveal which one failed.
    let user_ok = constant_time_eq(username.as_bytes(), credentials.username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), credentials.password.as_bytes());

    user_ok & pass_ok
}

/// Decodes `Basic <base64(user:pass)>`. The scheme is case-insensitive.
pub(crate) fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;

    Some((user.to_string(), pass.to_string()))
}

/// Compares two byte strings without exiting early on the first difference.
/// Length differences still fail, after a full pass over the longer input.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = (a.len() ^ b.len()) as u64;

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= u64::from(x ^ y);
    }

    diff == 0
}
