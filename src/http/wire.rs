/*!
Minimal HTTP/1.1 client codec shared by the socket transports.

Writes a single request with `Connection: close` and reads the response head,
tolerating both CRLF and bare LF line endings with a 64 KiB header cap. The body is
left on the wire and exposed as a reader that honors `Transfer-Encoding: chunked`,
`Content-Length`, or read-until-EOF, in that order of precedence.
*/

use std::io::{self, BufRead, BufReader, Read, Write};

use super::{Body, HeaderMap, Request, Response};

const HDR_CAP: usize = 64 * 1024;

/// Serialize `request` onto `w`. `host` becomes the `Host` header.
pub(crate) fn write_request<W: Write>(w: &mut W, request: &Request, host: &str) -> io::Result<()> {
    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: docker-facade/{}\r\nAccept: application/json\r\nConnection: close\r\n",
        request.method,
        request.path_and_query(),
        host,
        env!("CARGO_PKG_VERSION"),
    );
    for (k, v) in &request.headers {
        head.push_str(k);
        head.push_str(": ");
        head.push_str(v);
        head.push_str("\r\n");
    }
    let body: &[u8] = request.body.as_deref().unwrap_or_default();
    head.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));

    w.write_all(head.as_bytes())?;
    if !body.is_empty() {
        w.write_all(body)?;
    }
    w.flush()
}

/// Read the status line and headers from `stream`; the body stays unread.
pub(crate) fn read_response<R: Read + Send + 'static>(stream: R) -> io::Result<Response> {
    let mut reader = BufReader::new(stream);
    let mut consumed = 0usize;

    let status_line = read_head_line(&mut reader, &mut consumed)?
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before response"))?;
    let status = parse_status_line(&status_line)?;

    let mut headers = HeaderMap::new();
    loop {
        let line = match read_head_line(&mut reader, &mut consumed)? {
            Some(l) => l,
            None => break,
        };
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }

    let body = body_reader(reader, status, &headers)?;
    Ok(Response::new(status, headers, body))
}

fn body_reader<R: Read + Send + 'static>(
    reader: BufReader<R>,
    status: u16,
    headers: &HeaderMap,
) -> io::Result<Body> {
    if status == 204 || status == 304 || (100..200).contains(&status) {
        return Ok(Box::new(io::empty()));
    }
    let te = headers
        .get("transfer-encoding")
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    if te.contains("chunked") {
        return Ok(Box::new(ChunkedReader::new(reader)));
    }
    if let Some(v) = headers.get("content-length") {
        let len: u64 = v
            .trim()
            .parse()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("bad Content-Length: {v}")))?;
        return Ok(Box::new(LengthReader::new(reader, len)));
    }
    Ok(Box::new(reader))
}

// One head line without its terminator; None on EOF before any byte.
fn read_head_line<R: BufRead>(reader: &mut R, consumed: &mut usize) -> io::Result<Option<String>> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw)?;
    if n == 0 {
        return Ok(None);
    }
    *consumed += n;
    if *consumed > HDR_CAP {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "response headers exceed 64 KiB",
        ));
    }
    while matches!(raw.last(), Some(b'\n') | Some(b'\r')) {
        raw.pop();
    }
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

fn parse_status_line(line: &str) -> io::Result<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("not an HTTP status line: {line:?}"),
        ));
    }
    parts
        .next()
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("bad status line: {line:?}")))
}

/// De-chunks a `Transfer-Encoding: chunked` body as it is read. Trailers are consumed and dropped.
pub(crate) struct ChunkedReader<R> {
    inner: R,
    remaining: usize,
    done: bool,
}

impl<R: BufRead> ChunkedReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            remaining: 0,
            done: false,
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut raw = Vec::new();
        if self.inner.read_until(b'\n', &mut raw)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "chunked body ended early",
            ));
        }
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    fn next_chunk_size(&mut self) -> io::Result<usize> {
        let mut line = self.read_line()?;
        // Tolerate a stray blank line between chunks.
        if line.is_empty() {
            line = self.read_line()?;
        }
        let size_hex = line.split(';').next().unwrap_or(&line).trim();
        usize::from_str_radix(size_hex, 16).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("bad chunk size: {size_hex:?}"),
            )
        })
    }

    fn consume_trailers(&mut self) -> io::Result<()> {
        loop {
            let mut raw = Vec::new();
            if self.inner.read_until(b'\n', &mut raw)? == 0 {
                return Ok(());
            }
            if raw.iter().all(|b| *b == b'\r' || *b == b'\n') {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> Read for ChunkedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            let size = self.next_chunk_size()?;
            if size == 0 {
                self.consume_trailers()?;
                self.done = true;
                return Ok(0);
            }
            self.remaining = size;
        }
        let max = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "chunk payload truncated",
            ));
        }
        self.remaining -= n;
        if self.remaining == 0 {
            // CRLF that terminates the chunk payload
            let tail = self.read_line()?;
            if !tail.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "missing CRLF after chunk payload",
                ));
            }
        }
        Ok(n)
    }
}

/// Reads exactly `remaining` bytes; EOF before that is `UnexpectedEof`, not a short body.
pub(crate) struct LengthReader<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> LengthReader<R> {
    pub(crate) fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }
}

impl<R: Read> Read for LengthReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended {} bytes short of Content-Length", self.remaining),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use url::Url;

    fn parse(raw: &str) -> Response {
        read_response(io::Cursor::new(raw.as_bytes().to_vec())).expect("response")
    }

    #[test]
    fn test_write_request_line_headers_and_body() {
        let uri = Url::parse("http://localhost/v1.45/containers/create?name=web").unwrap();
        let req = Request::new(Method::Post, uri).json(&serde_json::json!({"Image": "alpine"}));
        let mut out = Vec::new();
        write_request(&mut out, &req, "localhost").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("POST /v1.45/containers/create?name=web HTTP/1.1\r\n"));
        assert!(text.contains("Host: localhost\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 18\r\n\r\n"));
        assert!(text.ends_with(r#"{"Image":"alpine"}"#));
    }

    #[test]
    fn test_write_request_without_body_sends_zero_length() {
        let uri = Url::parse("http://localhost/v1.45/containers/abc/start").unwrap();
        let req = Request::new(Method::Post, uri);
        let mut out = Vec::new();
        write_request(&mut out, &req, "localhost").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    }

    #[test]
    fn test_read_content_length_body() {
        let resp = parse("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"Id\":\"1\"}\nEXTRA");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.bytes().unwrap(), b"{\"Id\":\"1\"}\n");
    }

    #[test]
    fn test_read_chunked_body_with_trailers() {
        let resp = parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nabcd\r\n3;ext=1\r\nefg\r\n0\r\nX-Trailer: 1\r\n\r\n");
        assert_eq!(resp.bytes().unwrap(), b"abcdefg");
    }

    #[test]
    fn test_read_lf_only_head_and_eof_body() {
        let resp = parse("HTTP/1.1 200 OK\nServer: test\n\nline one\nline two\n");
        assert_eq!(resp.header("server"), Some("test"));
        assert_eq!(resp.bytes().unwrap(), b"line one\nline two\n");
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let resp = parse("HTTP/1.1 204 No Content\r\n\r\ngarbage");
        assert_eq!(resp.status(), 204);
        assert!(resp.bytes().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_http_status_line() {
        let err = read_response(io::Cursor::new(b"SSH-2.0-OpenSSH\r\n\r\n".to_vec())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_short_content_length_body_is_an_error() {
        let resp = parse("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello world");
        let err = resp.bytes().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_short_json_body_is_a_transport_error() {
        let resp = parse("HTTP/1.1 200 OK\r\nContent-Length: 40\r\n\r\n{\"Id\":\"1\"");
        let uri = Url::parse("http://localhost/v1.45/containers/1/json").unwrap();
        let err = crate::protocol::parse_object(resp, &uri).unwrap_err();
        assert!(matches!(err, crate::DockerError::Transport(_)), "{err:?}");
    }

    #[test]
    fn test_truncated_chunk_is_an_error() {
        let resp = parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\na\r\nabc");
        let err = resp.bytes().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
