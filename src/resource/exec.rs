use serde::Serialize;
use url::Url;

use super::logs::LogStream;
use super::Resource;
use crate::docker::Docker;
use crate::errors::{DockerError, Result};
use crate::http::{Method, SharedTransport};
use crate::validate::Operation;
use crate::JsonObject;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartBody {
    detach: bool,
    tty: bool,
}

/// An exec session created inside a running container.
#[derive(Clone, Debug)]
pub struct Exec {
    resource: Resource,
}

impl Exec {
    pub fn new(identity: JsonObject, uri: Url, transport: SharedTransport, docker: &Docker) -> Self {
        Self::from_resource(Resource::new(identity, uri, transport, docker.downgrade()))
    }

    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    /// Exec inspect reports the id as `ID`; creation responses use `Id`.
    pub fn id(&self) -> Option<&str> {
        self.resource
            .id()
            .or_else(|| self.identity().get("ID").and_then(serde_json::Value::as_str))
    }

    pub fn identity(&self) -> &JsonObject {
        self.resource.identity()
    }

    pub fn uri(&self) -> &Url {
        self.resource.uri()
    }

    pub fn docker(&self) -> Option<Docker> {
        self.resource.docker().upgrade()
    }

    pub fn inspect(&self) -> Result<JsonObject> {
        self.resource
            .call_json(Operation::ExecInspect, Method::Get, "/json", &[], None)
    }

    /// Start the session. Attached (`detach == false`) the returned stream carries the
    /// command's output until it exits; detached it is empty.
    pub fn start(&self, detach: bool) -> Result<LogStream> {
        let body = serde_json::to_value(StartBody { detach, tty: false }).map_err(|source| {
            DockerError::Json {
                uri: self.uri().to_string(),
                source,
            }
        })?;
        let (response, _) =
            self.resource
                .call(Operation::ExecStart, Method::Post, "/start", &[], Some(&body))?;
        Ok(LogStream::new(response.into_body()))
    }

    /// Resize the session's TTY.
    pub fn resize(&self, height: u32, width: u32) -> Result<()> {
        self.resource.call_discard(
            Operation::ExecResize,
            Method::Post,
            "/resize",
            &[("h", height.to_string()), ("w", width.to_string())],
        )
    }
}
