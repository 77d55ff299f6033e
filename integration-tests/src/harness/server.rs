use crate::harness::fixtures::Fixtures;
use crate::harness::raw::{RawResponse, raw_request};
use burrow_core::conf::{ServerConfig, ServerOptions};
use burrow_core::logging::{AccessLogEntry, RequestLogger};
use burrow_core::server::Server;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::redirect::Policy;
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Owned copy of one access log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub client_addr: Option<String>,
    /// `"local"` or `"proxied"`.
    pub disposition: String,
    pub error: Option<String>,
}

/// Logger that keeps every record in memory.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LoggedRequest>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<LoggedRequest> {
        self.entries.lock().expect("logger poisoned").clone()
    }
}

impl RequestLogger for RecordingLogger {
    fn log(&self, entry: &AccessLogEntry<'_>) {
        self.entries
            .lock()
            .expect("logger poisoned")
            .push(LoggedRequest {
                method: entry.method.to_string(),
                path: entry.path.to_string(),
                status: entry.status,
                client_addr: entry.client_addr.map(str::to_string),
                disposition: entry.disposition.as_str().to_string(),
                error: entry.error.map(str::to_string),
            });
    }
}

/// Handle to a running burrow instance serving a fresh fixture root.
pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    client: Client,
    logger: Arc<RecordingLogger>,
    fixtures: Fixtures,
}

impl TestServer {
    /// Starts burrow on a free localhost port. `tweak` adjusts the options
    /// after the fixture root has been filled in.
    ///
    /// Credentials are never read from the environment here.
    pub fn start(tweak: impl FnOnce(&mut ServerOptions)) -> Self {
        let fixtures = Fixtures::create();

        let mut options = ServerOptions {
            root: fixtures.root().to_path_buf(),
            ..ServerOptions::default()
        };
        tweak(&mut options);

        let config = ServerConfig::from_options_with_env(options, |_| None)
            .expect("invalid test server options");

        let logger = Arc::new(RecordingLogger::default());
        let server = Server::from_config(config).with_logger(logger.clone());

        let (ready_tx, ready_rx) = mpsc::channel();
        thread::spawn(move || {
            let result = server.listen(0, "127.0.0.1", move |addr| {
                let _ = ready_tx.send(addr);
            });
            if let Err(e) = result {
                panic!("burrow failed to start: {e:#}");
            }
        });

        let addr = ready_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("server never reported its address");

        wait_for_server(addr);

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .redirect(Policy::none())
            .build()
            .expect("failed to build client");

        Self {
            addr,
            base_url: format!("http://{addr}"),
            client,
            logger,
            fixtures,
        }
    }

    /// Default options.
    pub fn start_default() -> Self {
        Self::start(|_| {})
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn head(&self, path: &str) -> RequestBuilder {
        self.request(Method::HEAD, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Sends `target` without any client-side normalization.
    pub fn raw_get(&self, target: &str) -> RawResponse {
        raw_request(self.addr, "GET", target)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn root(&self) -> &Path {
        self.fixtures.root()
    }

    pub fn outside(&self) -> &Path {
        self.fixtures.outside()
    }

    /// Waits for the access log record of `path`; records are written after
    /// the response has been sent.
    pub fn wait_for_log(&self, path: &str) -> LoggedRequest {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(entry) = self
                .logger
                .entries()
                .into_iter()
                .find(|entry| entry.path == path)
            {
                return entry;
            }
            if Instant::now() > deadline {
                panic!(
                    "no access log record for {path}; got {:?}",
                    self.logger.entries()
                );
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

/// Poll until the server accepts connections (or panic).
fn wait_for_server(addr: SocketAddr) {
    let deadline = Instant::now() + Duration::from_secs(2);

    loop {
        match TcpStream::connect(addr) {
            Ok(_) => return,
            Err(_) => {
                if Instant::now() > deadline {
                    panic!("server failed to start at {addr}");
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}
