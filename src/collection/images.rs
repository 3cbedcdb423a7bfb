use serde::Deserialize;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use super::Collection;
use crate::docker::DockerRef;
use crate::errors::{DockerError, Result};
use crate::http::{Method, SharedTransport};
use crate::protocol::parse_object;
use crate::resource::Image;
use crate::validate::Operation;
use crate::JsonObject;

/// One line of the pull progress stream. Other fields (`progressDetail`, `id`) are ignored.
#[derive(Debug, Deserialize)]
struct PullEvent {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Every image on the daemon.
#[derive(Clone, Debug)]
pub struct Images {
    collection: Collection,
}

impl Images {
    pub(crate) fn new(base: Url, transport: SharedTransport, docker: DockerRef) -> Self {
        Self {
            collection: Collection::new(base, transport, docker),
        }
    }

    pub fn uri(&self) -> &Url {
        self.collection.uri()
    }

    pub fn list(&self) -> Result<impl Iterator<Item = Image>> {
        let items = self.collection.list(Operation::ImageList, &[])?;
        Ok(items.into_iter().map(Image::from_resource))
    }

    /// Wrap an image by id or `name[:tag]` without contacting the daemon.
    pub fn get(&self, name: &str) -> Image {
        Image::from_resource(self.collection.unverified(name))
    }

    /// Pull `name:tag` from its registry and return the local image.
    ///
    /// The daemon answers 200 as soon as the pull starts and reports failures inside
    /// the JSON progress stream, so the stream is read to the end and any `error`
    /// entry becomes [`DockerError::Stream`].
    #[cfg_attr(feature = "telemetry", instrument(level = "debug", skip(self)))]
    pub fn pull(&self, name: &str, tag: &str) -> Result<Image> {
        let (response, uri) = self.collection.call(
            Operation::ImagePull,
            Method::Post,
            "/create",
            &[("fromImage", name.to_string()), ("tag", tag.to_string())],
            None,
        )?;
        let progress =
            serde_json::Deserializer::from_reader(response.into_body()).into_iter::<PullEvent>();
        for event in progress {
            let event = event.map_err(|source| DockerError::Json {
                uri: uri.to_string(),
                source,
            })?;
            if let Some(message) = event.error {
                return Err(DockerError::Stream {
                    uri: uri.to_string(),
                    message,
                });
            }
            #[cfg(feature = "telemetry")]
            if let Some(status) = event.status.as_deref() {
                tracing::trace!(status, "pull progress");
            }
            #[cfg(not(feature = "telemetry"))]
            let _ = event.status;
        }
        Ok(self.get(&format!("{name}:{tag}")))
    }

    /// Remove dangling images; returns the daemon's report.
    pub fn prune(&self) -> Result<JsonObject> {
        let (response, uri) =
            self.collection
                .call(Operation::ImagePrune, Method::Post, "/prune", &[], None)?;
        parse_object(response, &uri)
    }
}
