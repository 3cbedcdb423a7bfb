/*!
Collection facades: all containers, all images, all exec sessions.

A collection lists entities (one GET, one facade per array element, daemon order
preserved), creates them, or wraps a caller-supplied id without any request.
*/

mod containers;
mod execs;
mod images;

pub use containers::Containers;
pub use execs::Execs;
pub use images::Images;

use serde_json::Value;
use url::Url;

use crate::docker::DockerRef;
use crate::errors::Result;
use crate::http::{Method, Response, SharedTransport};
use crate::protocol::{exchange, id_of, parse_object_array};
use crate::resource::Resource;
use crate::target::{self, Params};
use crate::validate::Operation;
use crate::JsonObject;

#[derive(Clone, Debug)]
pub(crate) struct Collection {
    base: Url,
    transport: SharedTransport,
    docker: DockerRef,
}

impl Collection {
    pub(crate) fn new(base: Url, transport: SharedTransport, docker: DockerRef) -> Self {
        Self {
            base,
            transport,
            docker,
        }
    }

    pub(crate) fn uri(&self) -> &Url {
        &self.base
    }

    /// Facade core for entity `id` with the given identity.
    pub(crate) fn resource(&self, id: &str, identity: JsonObject) -> Resource {
        Resource::new(
            identity,
            target::child(&self.base, id),
            self.transport.clone(),
            self.docker.clone(),
        )
    }

    /// Unverified facade core whose identity is just `{"Id": id}`.
    pub(crate) fn unverified(&self, id: &str) -> Resource {
        let mut identity = JsonObject::new();
        identity.insert("Id".to_string(), Value::String(id.to_string()));
        self.resource(id, identity)
    }

    pub(crate) fn call(
        &self,
        operation: Operation,
        method: Method,
        suffix: &str,
        params: &Params<'_>,
        body: Option<&Value>,
    ) -> Result<(Response, Url)> {
        let uri = target::build(&self.base, suffix, params);
        let response = exchange(self.transport.as_ref(), operation, method, uri.clone(), body)?;
        Ok((response, uri))
    }

    /// `GET {collection}/json`, one facade core per element, in array order.
    pub(crate) fn list(&self, operation: Operation, params: &Params<'_>) -> Result<Vec<Resource>> {
        let (response, uri) = self.call(operation, Method::Get, "/json", params, None)?;
        let items = parse_object_array(response, &uri)?;
        items
            .into_iter()
            .map(|item| {
                let id = id_of(&item, &uri)?.to_string();
                Ok(self.resource(&id, item))
            })
            .collect()
    }
}
