use std::io;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::{wire, Request, Response, Transport};

/// HTTP/1.1 over the daemon's Unix domain socket, one connection per request.
///
/// The request URI's scheme and authority are ignored; only its path and query
/// travel on the wire, with `Host: localhost`.
#[derive(Debug, Clone)]
pub struct UnixSocketTransport {
    socket: PathBuf,
    timeout: Option<Duration>,
}

impl UnixSocketTransport {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            timeout: None,
        }
    }

    /// Read/write timeout applied to each connection. `None` blocks indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }
}

impl Transport for UnixSocketTransport {
    #[cfg_attr(
        feature = "telemetry",
        instrument(level = "trace", skip_all, fields(socket = %self.socket.display()))
    )]
    fn send(&self, request: Request) -> io::Result<Response> {
        let mut stream = UnixStream::connect(&self.socket)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        wire::write_request(&mut stream, &request, "localhost")?;
        wire::read_response(stream)
    }
}
