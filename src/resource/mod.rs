/*!
Resource facades: local stand-ins for one remote container, image or exec session.

Every facade wraps the same [`Resource`] core: an immutable identity document, the
entity's URI, the shared transport and a weak handle to the root client. Operations
are stateless round trips; nothing on the facade changes after construction, so
fresh state is always a new `inspect()`.
*/

mod container;
mod exec;
mod image;
pub mod logs;

pub use container::{Container, RemoveOptions};
pub use exec::Exec;
pub use image::Image;

use serde_json::Value;
use url::Url;

use crate::docker::DockerRef;
use crate::errors::Result;
use crate::http::{Method, Response, SharedTransport};
use crate::protocol::{discard, exchange, parse_object, parse_object_array};
use crate::target::{self, Params};
use crate::validate::Operation;
use crate::JsonObject;

#[derive(Clone, Debug)]
pub(crate) struct Resource {
    identity: JsonObject,
    uri: Url,
    transport: SharedTransport,
    docker: DockerRef,
}

impl Resource {
    pub(crate) fn new(identity: JsonObject, uri: Url, transport: SharedTransport, docker: DockerRef) -> Self {
        Self {
            identity,
            uri,
            transport,
            docker,
        }
    }

    pub(crate) fn identity(&self) -> &JsonObject {
        &self.identity
    }

    pub(crate) fn uri(&self) -> &Url {
        &self.uri
    }

    pub(crate) fn docker(&self) -> &DockerRef {
        &self.docker
    }

    pub(crate) fn id(&self) -> Option<&str> {
        self.identity.get("Id").and_then(Value::as_str)
    }

    /// Build the request URI, send, validate. Returns the URI alongside for error context.
    pub(crate) fn call(
        &self,
        operation: Operation,
        method: Method,
        suffix: &str,
        params: &Params<'_>,
        body: Option<&Value>,
    ) -> Result<(Response, Url)> {
        let uri = target::build(&self.uri, suffix, params);
        let response = exchange(self.transport.as_ref(), operation, method, uri.clone(), body)?;
        Ok((response, uri))
    }

    pub(crate) fn call_json(
        &self,
        operation: Operation,
        method: Method,
        suffix: &str,
        params: &Params<'_>,
        body: Option<&Value>,
    ) -> Result<JsonObject> {
        let (response, uri) = self.call(operation, method, suffix, params, body)?;
        parse_object(response, &uri)
    }

    pub(crate) fn call_array(
        &self,
        operation: Operation,
        method: Method,
        suffix: &str,
        params: &Params<'_>,
    ) -> Result<Vec<JsonObject>> {
        let (response, uri) = self.call(operation, method, suffix, params, None)?;
        parse_object_array(response, &uri)
    }

    pub(crate) fn call_discard(
        &self,
        operation: Operation,
        method: Method,
        suffix: &str,
        params: &Params<'_>,
    ) -> Result<()> {
        let (response, _) = self.call(operation, method, suffix, params, None)?;
        discard(response)
    }
}
