use crate::ctx::RequestPath;

/// A name is hidden when it starts with a dot.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// True when any decoded segment of the request path is hidden.
pub fn has_hidden_segment(path: &RequestPath) -> bool {
    path.segments().iter().any(|s| is_hidden_name(s))
}
