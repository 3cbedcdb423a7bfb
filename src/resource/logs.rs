/*!
Container log retrieval.

The daemon answers `GET /containers/{id}/logs` with raw bytes, not JSON. For
containers started without a TTY those bytes are multiplexed: each frame carries an
8-byte header `[stream, 0, 0, 0, size (u32 big-endian)]` followed by `size` bytes of
payload. [`Frames`] splits such a stream; everything else here hands the bytes over
untouched.
*/

use std::io::{self, BufRead, BufReader, Read};

use super::Resource;
use crate::errors::Result;
use crate::http::{Body, Method};
use crate::target::flag;
use crate::validate::Operation;

/// Builder for one logs request. Selecting neither stream means both.
#[derive(Debug, Clone)]
pub struct Logs<'c> {
    resource: &'c Resource,
    stdout: bool,
    stderr: bool,
    timestamps: bool,
    tail: Option<usize>,
    since: Option<i64>,
}

impl<'c> Logs<'c> {
    pub(crate) fn new(resource: &'c Resource) -> Self {
        Self {
            resource,
            stdout: false,
            stderr: false,
            timestamps: false,
            tail: None,
            since: None,
        }
    }

    pub fn stdout(mut self) -> Self {
        self.stdout = true;
        self
    }

    pub fn stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    pub fn timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Only the last `lines` lines.
    pub fn tail(mut self, lines: usize) -> Self {
        self.tail = Some(lines);
        self
    }

    /// Only entries since this UNIX timestamp.
    pub fn since(mut self, unix_secs: i64) -> Self {
        self.since = Some(unix_secs);
        self
    }

    /// Everything logged so far, as (lossy) text.
    pub fn fetch(self) -> Result<String> {
        let bytes = self.open(false)?.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Everything logged so far, as a stream that ends when the backlog does.
    pub fn stream(self) -> Result<LogStream> {
        Ok(LogStream::new(self.open(false)?.into_body()))
    }

    /// Keep the connection open and stream new output as it is produced.
    pub fn follow(self) -> Result<LogStream> {
        Ok(LogStream::new(self.open(true)?.into_body()))
    }

    fn open(&self, follow: bool) -> Result<crate::http::Response> {
        let params = self.params(follow);
        let (response, _) =
            self.resource
                .call(Operation::ContainerLogs, Method::Get, "/logs", &params, None)?;
        Ok(response)
    }

    fn params(&self, follow: bool) -> Vec<(&'static str, String)> {
        let (stdout, stderr) = if !self.stdout && !self.stderr {
            (true, true)
        } else {
            (self.stdout, self.stderr)
        };
        let mut params = vec![
            ("follow", flag(follow)),
            ("stdout", flag(stdout)),
            ("stderr", flag(stderr)),
            ("timestamps", flag(self.timestamps)),
        ];
        if let Some(n) = self.tail {
            params.push(("tail", n.to_string()));
        }
        if let Some(ts) = self.since {
            params.push(("since", ts.to_string()));
        }
        params
    }
}

/// Raw output stream of a container or exec session.
pub struct LogStream {
    body: Body,
}

impl LogStream {
    pub(crate) fn new(body: Body) -> Self {
        Self { body }
    }

    /// Line iterator for TTY (non-multiplexed) output.
    pub fn lines(self) -> io::Lines<BufReader<LogStream>> {
        BufReader::new(self).lines()
    }

    /// Frame iterator for multiplexed (non-TTY) output.
    pub fn frames(self) -> Frames<LogStream> {
        Frames::new(self)
    }
}

impl Read for LogStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl std::fmt::Debug for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: StreamKind,
    pub payload: Vec<u8>,
}

/// Splits a multiplexed stream into frames. Ends cleanly at EOF on a frame boundary.
#[derive(Debug)]
pub struct Frames<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> Frames<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    fn read_header(&mut self) -> io::Result<Option<[u8; 8]>> {
        let mut header = [0u8; 8];
        let mut filled = 0;
        while filled < header.len() {
            match self.inner.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "log frame header truncated",
                    ))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(Some(header))
    }

    fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        let header = match self.read_header()? {
            Some(h) => h,
            None => return Ok(None),
        };
        let kind = match header[0] {
            0 => StreamKind::Stdin,
            1 => StreamKind::Stdout,
            2 => StreamKind::Stderr,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unknown log stream type {other}"),
                ))
            }
        };
        let size = u64::from(u32::from_be_bytes([header[4], header[5], header[6], header[7]]));
        // Sized by what arrives, not by the header.
        let mut payload = Vec::new();
        (&mut self.inner).take(size).read_to_end(&mut payload)?;
        if (payload.len() as u64) < size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("log frame truncated: {} of {size} bytes", payload.len()),
            ));
        }
        Ok(Some(Frame { kind, payload }))
    }
}

impl<R: Read> Iterator for Frames<R> {
    type Item = io::Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
        let mut v = vec![kind, 0, 0, 0];
        v.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn test_frames_split_stdout_and_stderr() {
        let mut raw = frame(1, b"hello\n");
        raw.extend(frame(2, b"oops\n"));
        let frames: Vec<Frame> = Frames::new(io::Cursor::new(raw))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            frames,
            vec![
                Frame { kind: StreamKind::Stdout, payload: b"hello\n".to_vec() },
                Frame { kind: StreamKind::Stderr, payload: b"oops\n".to_vec() },
            ]
        );
    }

    #[test]
    fn test_truncated_frame_errors_once() {
        let mut raw = frame(1, b"hello");
        raw.truncate(10);
        let mut it = Frames::new(io::Cursor::new(raw));
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_oversized_header_fails_without_allocating_it() {
        let mut raw = vec![1u8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        raw.extend_from_slice(b"tiny");
        let mut it = Frames::new(io::Cursor::new(raw));
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(it.next().is_none());
    }

    #[test]
    fn test_unknown_stream_type() {
        let raw = frame(7, b"x");
        let mut it = Frames::new(io::Cursor::new(raw));
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_empty_stream_has_no_frames() {
        assert!(Frames::new(io::empty()).next().is_none());
    }
}
