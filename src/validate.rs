/*!
Response validation against per-operation acceptable status sets.

The Engine API reuses 304/404/409/500 with different meanings per endpoint, so there
is no global notion of "success". Every call site names its [`Operation`] and the
table below decides which codes let the response through.
*/

use std::fmt;

use url::Url;

use crate::errors::{DockerError, Result};
use crate::http::{Method, Response};

/// Every request the facades can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ContainerInspect,
    ContainerStart,
    ContainerStop,
    ContainerRestart,
    ContainerKill,
    ContainerPause,
    ContainerUnpause,
    ContainerRename,
    ContainerRemove,
    ContainerWait,
    ContainerLogs,
    ContainerTop,
    ContainerExec,
    ContainerList,
    ContainerCreate,
    ContainerPrune,
    ImageInspect,
    ImageHistory,
    ImageTag,
    ImageDelete,
    ImageList,
    ImagePull,
    ImagePrune,
    ExecInspect,
    ExecStart,
    ExecResize,
    Ping,
    Version,
    Info,
}

impl Operation {
    /// Status codes that mean success for this operation.
    pub const fn accepted(self) -> &'static [u16] {
        use Operation::*;
        match self {
            ContainerStart | ContainerStop | ContainerRestart | ContainerKill | ContainerPause
            | ContainerUnpause | ContainerRename | ContainerRemove => &[204],
            ContainerExec | ContainerCreate | ImageTag => &[201],
            ExecResize => &[200, 201],
            ContainerInspect | ContainerWait | ContainerLogs | ContainerTop | ContainerList
            | ContainerPrune | ImageInspect | ImageHistory | ImageDelete | ImageList
            | ImagePull | ImagePrune | ExecInspect | ExecStart | Ping | Version | Info => &[200],
        }
    }

    pub fn accepts(self, status: u16) -> bool {
        self.accepted().contains(&status)
    }

    pub const fn name(self) -> &'static str {
        use Operation::*;
        match self {
            ContainerInspect => "container inspect",
            ContainerStart => "container start",
            ContainerStop => "container stop",
            ContainerRestart => "container restart",
            ContainerKill => "container kill",
            ContainerPause => "container pause",
            ContainerUnpause => "container unpause",
            ContainerRename => "container rename",
            ContainerRemove => "container remove",
            ContainerWait => "container wait",
            ContainerLogs => "container logs",
            ContainerTop => "container top",
            ContainerExec => "container exec",
            ContainerList => "container list",
            ContainerCreate => "container create",
            ContainerPrune => "container prune",
            ImageInspect => "image inspect",
            ImageHistory => "image history",
            ImageTag => "image tag",
            ImageDelete => "image delete",
            ImageList => "image list",
            ImagePull => "image pull",
            ImagePrune => "image prune",
            ExecInspect => "exec inspect",
            ExecStart => "exec start",
            ExecResize => "exec resize",
            Ping => "ping",
            Version => "version",
            Info => "info",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pass `response` through if its status is accepted for `operation`.
///
/// On mismatch the body is left unread and dropped with the response.
pub fn validate(response: Response, operation: Operation, method: Method, uri: &Url) -> Result<Response> {
    let status = response.status();
    if operation.accepts(status) {
        return Ok(response);
    }
    Err(DockerError::UnexpectedResponse {
        operation,
        method,
        uri: uri.to_string(),
        status,
        expected: operation.accepted(),
    })
}
