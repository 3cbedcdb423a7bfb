use std::io;
use std::net::TcpStream;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::{wire, Request, Response, Transport};

/// Port assumed for `tcp://` daemons that do not name one. `http://` keeps its scheme default.
pub const DEFAULT_TCP_PORT: u16 = 2375;

/// Plain-text HTTP/1.1 over TCP, one connection per request.
///
/// The peer is taken from each request's URI, so one instance can serve any
/// `http://` base the root client was built with.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    timeout: Option<Duration>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read/write timeout applied to each connection. `None` blocks indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Transport for TcpTransport {
    #[cfg_attr(
        feature = "telemetry",
        instrument(level = "trace", skip_all, fields(host = request.uri.host_str().unwrap_or_default()))
    )]
    fn send(&self, request: Request) -> io::Result<Response> {
        let addrs = request.uri.socket_addrs(|| Some(DEFAULT_TCP_PORT))?;
        let mut stream = TcpStream::connect(&*addrs)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;

        let host = match (request.uri.host_str(), request.uri.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => "localhost".to_string(),
        };
        wire::write_request(&mut stream, &request, &host)?;
        wire::read_response(stream)
    }
}
