use serde_json::{json, Value};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::Collection;
use crate::docker::DockerRef;
use crate::errors::Result;
use crate::http::{Method, SharedTransport};
use crate::protocol::{id_of, parse_object};
use crate::resource::Container;
use crate::target::flag;
use crate::validate::Operation;
use crate::JsonObject;

/// Every container on the daemon.
#[derive(Clone, Debug)]
pub struct Containers {
    collection: Collection,
}

impl Containers {
    pub(crate) fn new(base: Url, transport: SharedTransport, docker: DockerRef) -> Self {
        Self {
            collection: Collection::new(base, transport, docker),
        }
    }

    /// Collection URI, e.g. `http://localhost/v1.45/containers`.
    pub fn uri(&self) -> &Url {
        self.collection.uri()
    }

    /// Running containers, in daemon order.
    pub fn list(&self) -> Result<impl Iterator<Item = Container>> {
        let items = self.collection.list(Operation::ContainerList, &[])?;
        Ok(items.into_iter().map(Container::from_resource))
    }

    /// All containers including stopped ones (`all=true`).
    pub fn list_all(&self) -> Result<impl Iterator<Item = Container>> {
        let items = self
            .collection
            .list(Operation::ContainerList, &[("all", flag(true))])?;
        Ok(items.into_iter().map(Container::from_resource))
    }

    /// Create a container from a full create body (`Image`, `Cmd`, `HostConfig`, ...).
    pub fn create(&self, spec: &Value) -> Result<Container> {
        self.create_with(None, spec)
    }

    pub fn create_named(&self, name: &str, spec: &Value) -> Result<Container> {
        self.create_with(Some(name), spec)
    }

    /// Create a container with nothing but `{"Image": image}`.
    pub fn create_from_image(&self, image: &str) -> Result<Container> {
        self.create(&json!({ "Image": image }))
    }

    /// Wrap an existing container by id or name. Sends nothing; the identity is just
    /// `{"Id": id}` until the caller inspects.
    pub fn get(&self, id: &str) -> Container {
        Container::from_resource(self.collection.unverified(id))
    }

    /// Remove all stopped containers; returns the daemon's report.
    pub fn prune(&self) -> Result<JsonObject> {
        let (response, uri) =
            self.collection
                .call(Operation::ContainerPrune, Method::Post, "/prune", &[], None)?;
        parse_object(response, &uri)
    }

    #[cfg_attr(feature = "telemetry", instrument(level = "debug", skip(self, spec)))]
    fn create_with(&self, name: Option<&str>, spec: &Value) -> Result<Container> {
        let params: Vec<(&str, String)> = name
            .map(|n| vec![("name", n.to_string())])
            .unwrap_or_default();
        let (response, uri) = self.collection.call(
            Operation::ContainerCreate,
            Method::Post,
            "/create",
            &params,
            Some(spec),
        )?;
        let created = parse_object(response, &uri)?;
        let id = id_of(&created, &uri)?.to_string();
        Ok(Container::from_resource(self.collection.resource(&id, created)))
    }
}
