/*!
Transport boundary: one HTTP request in, one HTTP response out.

The facades never touch sockets directly. They build a [`Request`], hand it to a
shared [`Transport`] and get back a [`Response`] whose body is still a stream, so
callers that only care about the status never pay for reading a body.

Three transports ship with the crate:
- [`UnixSocketTransport`]: HTTP/1.1 over the daemon's Unix domain socket (unix only)
- [`TcpTransport`]: HTTP/1.1 over a plain TCP connection
- [`RemoteTransport`]: reqwest's blocking client, for `https://` daemons
*/

mod remote;
mod tcp;
#[cfg(unix)]
mod unix;
pub(crate) mod wire;

pub use remote::RemoteTransport;
pub use tcp::{TcpTransport, DEFAULT_TCP_PORT};
#[cfg(unix)]
pub use unix::UnixSocketTransport;

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use serde_json::Value;
use url::Url;

/// HTTP methods spoken by the Engine API facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response headers, keys lowercased.
pub type HeaderMap = BTreeMap<String, String>;

/// Streamed response body.
pub type Body = Box<dyn Read + Send>;

/// An outgoing request: method, absolute URI, extra headers and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub uri: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON document as the request body.
    pub fn json(mut self, body: &Value) -> Self {
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        self.body = Some(body.to_string().into_bytes());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Origin-form target for the request line, e.g. `/v1.45/containers/123/json?all=true`.
    pub fn path_and_query(&self) -> String {
        match self.uri.query() {
            Some(q) => format!("{}?{}", self.uri.path(), q),
            None => self.uri.path().to_string(),
        }
    }
}

/// A received response. The body has not been read yet.
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// In-memory response, handy for transports that buffer and for test doubles.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HeaderMap::new(), Box::new(io::Cursor::new(body.into())))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    /// Read the whole body into memory.
    pub fn bytes(self) -> io::Result<Vec<u8>> {
        let mut body = self.body;
        let mut buf = Vec::new();
        body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read and drop the body so the exchange is complete.
    pub fn drain(self) -> io::Result<u64> {
        let mut body = self.body;
        io::copy(&mut body, &mut io::sink())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Capability to send one request and receive one response.
///
/// Implementations carry no per-entity state; a single instance is shared by the
/// root client and every facade handed out from it, possibly across threads.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: Request) -> io::Result<Response>;
}

/// Shared transport handle.
pub type SharedTransport = Arc<dyn Transport>;
