pub(crate) mod cache;
pub(crate) mod compression;
pub(crate) mod directory;
pub(crate) mod etag;
mod file;
pub(crate) mod headers;
pub(crate) mod negotiate;
pub(crate) mod range;

pub use directory::render_directory;
pub use file::render_file;
