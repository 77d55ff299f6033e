//! Serving files and directory listings from the document root.

pub mod handler;
pub(crate) mod render;
mod resolve;
mod response;

#[cfg(test)]
mod tests;

pub use handler::{StaticOutcome, handle_static_request};
pub use resolve::{ResolveError, ResolveOptions, Resolved, resolve_static_path};
pub use response::{ConditionalHeaders, ServeError, StaticBody, StaticResponse};
