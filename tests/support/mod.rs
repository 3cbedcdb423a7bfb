/*!
Test support helpers shared across integration tests.

- MockDaemon: in-memory transport replaying queued replies and recording every request
- docker(mock): client over a mock with base `http://localhost/v1.45`
- line(req): `"METHOD /path?query"` for compact request assertions
- fake_unix_daemon / fake_tcp_daemon: one-connection-per-reply HTTP servers
- http_json(status, body): canned raw HTTP response
*/

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use docker_facade::http::{Request, Response, SharedTransport, Transport};
use docker_facade::Docker;
use url::Url;

pub const BASE: &str = "http://localhost/v1.45";

enum Reply {
    Status(u16, Vec<u8>),
    Fail(io::ErrorKind),
}

#[derive(Default)]
pub struct MockDaemon {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<Request>>,
}

impl std::fmt::Debug for MockDaemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDaemon").finish_non_exhaustive()
    }
}

#[allow(dead_code)]
impl MockDaemon {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply with `status` and `body`.
    pub fn reply(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Status(status, body.into()));
        self
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, kind: io::ErrorKind) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Fail(kind));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(line).collect()
    }

    pub fn last(&self) -> Request {
        self.seen
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Transport for MockDaemon {
    fn send(&self, request: Request) -> io::Result<Response> {
        let reply = self.replies.lock().unwrap().pop_front();
        let summary = line(&request);
        self.seen.lock().unwrap().push(request);
        match reply {
            Some(Reply::Status(status, body)) => Ok(Response::from_bytes(status, body)),
            Some(Reply::Fail(kind)) => Err(io::Error::new(kind, "mock transport failure")),
            None => Err(io::Error::other(format!("unexpected request: {summary}"))),
        }
    }
}

#[allow(dead_code)]
pub fn docker(mock: &Arc<MockDaemon>) -> Docker {
    let transport: SharedTransport = mock.clone();
    Docker::new(transport, Url::parse(BASE).unwrap())
}

pub fn line(req: &Request) -> String {
    format!("{} {}", req.method, req.path_and_query())
}

/// Read one HTTP request (head plus Content-Length body) from `stream`, answer with
/// `raw` verbatim and return what was received.
#[allow(dead_code)]
pub fn serve_one<S: io::Read + io::Write>(stream: S, raw: &[u8]) -> String {
    use std::io::{BufRead, BufReader, Read, Write};

    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    let mut content_length = 0usize;
    loop {
        let mut l = String::new();
        if reader.read_line(&mut l).expect("read request") == 0 {
            break;
        }
        if let Some(v) = l.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = v.trim().parse().unwrap_or(0);
        }
        let end = l == "\r\n";
        head.push_str(&l);
        if end {
            break;
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("read request body");
    head.push_str(&String::from_utf8_lossy(&body));
    let stream = reader.get_mut();
    stream.write_all(raw).expect("write response");
    stream.flush().expect("flush response");
    head
}

/// Serve one canned raw HTTP response per accepted connection on a fresh Unix socket.
/// Returns the temp dir holding the socket, the socket path and the server thread,
/// which yields the raw requests it received.
#[cfg(unix)]
#[allow(dead_code)]
pub fn fake_unix_daemon(
    responses: Vec<Vec<u8>>,
) -> (
    tempfile::TempDir,
    std::path::PathBuf,
    std::thread::JoinHandle<Vec<String>>,
) {
    use std::os::unix::net::UnixListener;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docker.sock");
    let listener = UnixListener::bind(&path).expect("bind unix socket");
    let handle = std::thread::spawn(move || {
        responses
            .iter()
            .map(|raw| {
                let (stream, _) = listener.accept().expect("accept");
                serve_one(stream, raw)
            })
            .collect()
    });
    (dir, path, handle)
}

/// Same as [`fake_unix_daemon`] on an ephemeral 127.0.0.1 port.
#[allow(dead_code)]
pub fn fake_tcp_daemon(responses: Vec<Vec<u8>>) -> (u16, std::thread::JoinHandle<Vec<String>>) {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind tcp");
    let port = listener.local_addr().expect("local addr").port();
    let handle = std::thread::spawn(move || {
        responses
            .iter()
            .map(|raw| {
                let (stream, _) = listener.accept().expect("accept");
                serve_one(stream, raw)
            })
            .collect()
    });
    (port, handle)
}

/// `HTTP/1.1 {status}` response with a JSON body and Content-Length.
#[allow(dead_code)]
pub fn http_json(status: u16, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

/// `HTTP/1.1 {status}` response with an arbitrary binary body and Content-Length.
pub fn http_bytes(status: u16, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut raw = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    raw.extend_from_slice(body);
    raw
}

/// One multiplexed output frame: `[kind, 0, 0, 0, len (u32 BE)]` + payload.
pub fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut v = vec![kind, 0, 0, 0];
    v.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    v.extend_from_slice(payload);
    v
}
