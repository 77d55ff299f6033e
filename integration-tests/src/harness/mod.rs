pub mod fixtures;
pub mod raw;
pub mod server;
pub mod upstream;

pub use fixtures::Fixtures;
pub use raw::{RawResponse, raw_request};
pub use server::{LoggedRequest, RecordingLogger, TestServer};
pub use upstream::{StubUpstream, closed_port_url};
