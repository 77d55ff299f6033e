mod static_file;

pub use static_file::StaticFileHandler;
