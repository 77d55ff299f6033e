mod normalization;
mod request_ctx;

#[cfg(test)]
mod tests;

pub use normalization::{PathRejection, RequestPath, normalize_path};
pub use request_ctx::{Disposition, RequestCtx};
