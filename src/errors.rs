//! Error model for the facades.
//!
//! - One status-level failure, `UnexpectedResponse`, parameterized by the observed code;
//!   which codes count as success lives in [`crate::validate::Operation::accepted`].
//! - Body parsing failures (`Json`, `MalformedBody`, `Stream`) are never folded into it.
//! - Transport failures pass through untouched as `Transport(io::Error)`.
use std::io;

use thiserror::Error;

use crate::http::Method;
use crate::validate::Operation;

#[derive(Debug, Error)]
pub enum DockerError {
    /// The daemon answered with a status outside the operation's accepted set.
    #[error("{operation}: {method} {uri} returned {status}, expected {expected:?}")]
    UnexpectedResponse {
        operation: Operation,
        method: Method,
        uri: String,
        status: u16,
        expected: &'static [u16],
    },

    #[error("{uri}: invalid JSON in response body: {source}")]
    Json {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, wrong shape (not an object, missing `Id`, missing `StatusCode`, ...).
    #[error("{uri}: {reason}")]
    MalformedBody { uri: String, reason: String },

    /// The daemon accepted the request but reported a failure inside a progress stream.
    #[error("{uri}: daemon reported: {message}")]
    Stream { uri: String, message: String },

    #[error(transparent)]
    Transport(#[from] io::Error),

    /// A facade needed the root client for a cross-collection lookup after it was dropped.
    #[error("the Docker client this object came from has been dropped")]
    Detached,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = DockerError> = std::result::Result<T, E>;

impl DockerError {
    /// Observed status code for `UnexpectedResponse`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            DockerError::UnexpectedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub(crate) fn malformed(uri: impl ToString, reason: impl Into<String>) -> Self {
        DockerError::MalformedBody {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (no daemon socket at the configured path)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert DockerError to exit code (parity with io::Error mapping).
pub fn exit_code_for_error(e: &DockerError) -> u8 {
    match e {
        DockerError::Transport(ioe) => exit_code_for_io_error(ioe),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unexpected(status: u16) -> DockerError {
        DockerError::UnexpectedResponse {
            operation: Operation::ContainerStart,
            method: Method::Post,
            uri: "http://localhost/v1.45/containers/123/start".to_string(),
            status,
            expected: Operation::ContainerStart.accepted(),
        }
    }

    #[test]
    fn test_display_names_operation_request_and_codes() {
        let msg = unexpected(304).to_string();
        assert_eq!(
            msg,
            "container start: POST http://localhost/v1.45/containers/123/start returned 304, expected [204]"
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(unexpected(404).is_not_found());
        assert!(unexpected(409).is_conflict());
        assert_eq!(DockerError::Detached.status(), None);
    }

    #[test]
    fn test_exit_codes() {
        let missing = DockerError::Transport(io::Error::new(io::ErrorKind::NotFound, "no socket"));
        assert_eq!(exit_code_for_error(&missing), 127);
        let refused =
            DockerError::Transport(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(exit_code_for_error(&refused), 1);
        assert_eq!(exit_code_for_error(&unexpected(500)), 1);
    }
}
