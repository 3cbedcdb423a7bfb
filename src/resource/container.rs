use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::exec::Exec;
use super::logs::Logs;
use super::Resource;
use crate::docker::Docker;
use crate::errors::{DockerError, Result};
use crate::http::{Method, SharedTransport};
use crate::target::flag;
use crate::validate::Operation;
use crate::JsonObject;

/// A container on the daemon.
#[derive(Clone, Debug)]
pub struct Container {
    resource: Resource,
}

/// Query flags for [`Container::remove_with`]. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Remove anonymous volumes attached to the container.
    pub volumes: bool,
    /// Kill a running container before removing it.
    pub force: bool,
    /// Remove the link with this name instead of the container.
    pub link: bool,
}

impl Container {
    /// Facade around an identity the caller already holds (e.g. from a create response).
    pub fn new(identity: JsonObject, uri: Url, transport: SharedTransport, docker: &Docker) -> Self {
        Self::from_resource(Resource::new(identity, uri, transport, docker.downgrade()))
    }

    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    /// `Id` from the identity document, if it carries one.
    pub fn id(&self) -> Option<&str> {
        self.resource.id()
    }

    /// Identity as it was when this facade was built. Use [`Container::inspect`] for fresh state.
    pub fn identity(&self) -> &JsonObject {
        self.resource.identity()
    }

    pub fn uri(&self) -> &Url {
        self.resource.uri()
    }

    /// The client this container came from, if it is still alive.
    pub fn docker(&self) -> Option<Docker> {
        self.resource.docker().upgrade()
    }

    /// `GET /containers/{id}/json`
    pub fn inspect(&self) -> Result<JsonObject> {
        self.resource
            .call_json(Operation::ContainerInspect, Method::Get, "/json", &[], None)
    }

    pub fn start(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerStart, Method::Post, "/start", &[])
    }

    pub fn stop(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerStop, Method::Post, "/stop", &[])
    }

    pub fn restart(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerRestart, Method::Post, "/restart", &[])
    }

    pub fn kill(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerKill, Method::Post, "/kill", &[])
    }

    pub fn pause(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerPause, Method::Post, "/pause", &[])
    }

    pub fn unpause(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ContainerUnpause, Method::Post, "/unpause", &[])
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        self.resource.call_discard(
            Operation::ContainerRename,
            Method::Post,
            "/rename",
            &[("name", name.to_string())],
        )
    }

    /// `DELETE /containers/{id}?v=false&force=false&link=false`
    pub fn remove(&self) -> Result<()> {
        self.remove_with(RemoveOptions::default())
    }

    pub fn remove_with(&self, opts: RemoveOptions) -> Result<()> {
        self.resource.call_discard(
            Operation::ContainerRemove,
            Method::Delete,
            "",
            &[
                ("v", flag(opts.volumes)),
                ("force", flag(opts.force)),
                ("link", flag(opts.link)),
            ],
        )
    }

    /// Block until the container reaches `condition` (daemon default when `None`,
    /// otherwise e.g. `"not-running"`, `"next-exit"`, `"removed"`) and return its exit code.
    #[cfg_attr(feature = "telemetry", instrument(level = "debug", skip(self), fields(uri = %self.uri())))]
    pub fn wait(&self, condition: Option<&str>) -> Result<i64> {
        let params: Vec<(&str, String)> = condition
            .map(|c| vec![("condition", c.to_string())])
            .unwrap_or_default();
        let (response, uri) =
            self.resource
                .call(Operation::ContainerWait, Method::Post, "/wait", &params, None)?;
        let body = crate::protocol::parse_object(response, &uri)?;
        body.get("StatusCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| DockerError::malformed(&uri, "wait response has no integer \"StatusCode\""))
    }

    /// Log retrieval for this container; see [`Logs`].
    pub fn logs(&self) -> Logs<'_> {
        Logs::new(&self.resource)
    }

    /// Processes running inside the container, `ps_args` defaulting to the daemon's `-ef`.
    pub fn top(&self, ps_args: Option<&str>) -> Result<JsonObject> {
        let params: Vec<(&str, String)> = ps_args
            .map(|a| vec![("ps_args", a.to_string())])
            .unwrap_or_default();
        self.resource
            .call_json(Operation::ContainerTop, Method::Get, "/top", &params, None)
    }

    /// Create an exec session from `spec` (`Cmd`, `AttachStdout`, `Tty`, ...) and resolve
    /// it through the client's exec collection, which inspects it once.
    #[cfg_attr(feature = "telemetry", instrument(level = "debug", skip_all, fields(uri = %self.uri())))]
    pub fn exec(&self, spec: &Value) -> Result<Exec> {
        let (response, uri) =
            self.resource
                .call(Operation::ContainerExec, Method::Post, "/exec", &[], Some(spec))?;
        let created = crate::protocol::parse_object(response, &uri)?;
        let id = crate::protocol::id_of(&created, &uri)?;
        let docker = self.resource.docker().require()?;
        docker.execs().get(id)
    }
}
