//! Access policy applied before any filesystem access: basic authentication,
//! the robots.txt short-circuit and dotfile hiding.

mod auth;
mod dotfiles;
mod robots;

#[cfg(test)]
mod tests;

pub use auth::{BASIC_CHALLENGE, is_authorized};
pub use dotfiles::{has_hidden_segment, is_hidden_name};
pub use robots::{ROBOTS_BODY, is_robots_request};

use crate::conf::ServerConfig;
use crate::ctx::RequestPath;
use http::HeaderValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Continue to resolution.
    Allow,
    /// Missing or wrong credentials (401 with challenge).
    Unauthorized,
    /// Answer with the fixed robots body.
    Robots,
    /// Dotfile with hiding enabled (404).
    Hidden,
}

/// Applies the guard in order: authentication, robots, dotfiles.
pub fn check_access(
    config: &ServerConfig,
    path: &RequestPath,
    authorization: Option<&HeaderValue>,
) -> AccessDecision {
    if let Some(credentials) = &config.credentials {
        if !is_authorized(credentials, authorization) {
            return AccessDecision::Unauthorized;
        }
    }

    if config.robots && is_robots_request(path) {
        return AccessDecision::Robots;
    }

    if !config.show_dotfiles && has_hidden_segment(path) {
        return AccessDecision::Hidden;
    }

    AccessDecision::Allow
}
