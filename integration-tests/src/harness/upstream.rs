use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A one-response-per-connection HTTP/1.1 upstream that records every
/// request head it receives.
pub struct StubUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubUpstream {
    /// Answers every request with `status_line` (e.g. `"418 I'm a teapot"`)
    /// and `body`.
    pub fn start(status_line: &'static str, body: &'static [u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind upstream");
        let addr = listener.local_addr().expect("upstream local_addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                let head = serve_one(stream, status_line, body);
                seen.lock().expect("upstream log poisoned").push(head);
            }
        });

        Self { addr, requests }
    }

    /// Accepts connections and reads request heads but never answers.
    pub fn stalled() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind upstream");
        let addr = listener.local_addr().expect("upstream local_addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        thread::spawn(move || {
            // Held open so the proxy sees a live but silent peer.
            let mut held = Vec::new();
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let head = read_head(&mut stream);
                seen.lock().expect("upstream log poisoned").push(head);
                held.push(stream);
            }
        });

        Self { addr, requests }
    }

    /// Origin URL suitable for the `proxy` option.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Request heads received so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("upstream log poisoned").clone()
    }

    /// Waits until at least `n` requests were recorded.
    pub fn wait_for_requests(&self, n: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let seen = self.requests();
            if seen.len() >= n {
                return seen;
            }
            if Instant::now() > deadline {
                panic!("upstream saw {} requests, expected {n}", seen.len());
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn serve_one(mut stream: TcpStream, status_line: &str, body: &[u8]) -> String {
    let head = read_head(&mut stream);

    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nX-Upstream: stub\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();

    head
}

/// Reads one request head and drains its body.
fn read_head(stream: &mut TcpStream) -> String {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head_end = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map_or(buf.len(), |pos| pos + 4);
    let head = String::from_utf8_lossy(&buf[..head_end]).trim_end().to_string();

    // Drain the request body so closing the socket does not reset it.
    let body_len = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut received = buf.len() - head_end;
    while received < body_len {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => received += n,
        }
    }

    head
}

/// An address nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind a free port");
    let addr = listener.local_addr().expect("free port local_addr");
    drop(listener);
    format!("http://{addr}")
}
