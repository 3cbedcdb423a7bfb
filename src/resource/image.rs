use url::Url;

use super::container::Container;
use super::Resource;
use crate::docker::Docker;
use crate::errors::Result;
use crate::http::{Method, SharedTransport};
use crate::validate::Operation;
use crate::JsonObject;

/// An image known to the daemon, addressed by id or `name[:tag]`.
#[derive(Clone, Debug)]
pub struct Image {
    resource: Resource,
}

impl Image {
    pub fn new(identity: JsonObject, uri: Url, transport: SharedTransport, docker: &Docker) -> Self {
        Self::from_resource(Resource::new(identity, uri, transport, docker.downgrade()))
    }

    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    pub fn id(&self) -> Option<&str> {
        self.resource.id()
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

    /// The name this image is addressed by: the URI path after `/images/`, decoded.
    pub fn reference(&self) -> String {
        let path = self.uri().path();
        let raw = match path.rsplit_once("/images/") {
            Some((_, rest)) => rest,
            None => path.rsplit('/').next().unwrap_or(path),
        };
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    }

    pub fn inspect(&self) -> Result<JsonObject> {
        self.resource
            .call_json(Operation::ImageInspect, Method::Get, "/json", &[], None)
    }

    /// Layer history, newest first as the daemon reports it.
    pub fn history(&self) -> Result<impl Iterator<Item = JsonObject>> {
        let entries =
            self.resource
                .call_array(Operation::ImageHistory, Method::Get, "/history", &[])?;
        Ok(entries.into_iter())
    }

    /// Add `repo:tag` as a new name for this image.
    pub fn tag(&self, repo: &str, tag: &str) -> Result<()> {
        self.resource.call_discard(
            Operation::ImageTag,
            Method::Post,
            "/tag",
            &[("repo", repo.to_string()), ("tag", tag.to_string())],
        )
    }

    /// `DELETE` on the image URI. The daemon's list of untagged/deleted layers is dropped.
    pub fn delete(&self) -> Result<()> {
        self.resource
            .call_discard(Operation::ImageDelete, Method::Delete, "", &[])
    }

    /// Create a container from this image and start it.
    ///
    /// Two requests: create, then start. If start fails the created container is
    /// left in place and the start error is returned.
    pub fn run(&self) -> Result<Container> {
        let docker = self.resource.docker().require()?;
        let container = docker.containers().create_from_image(&self.reference())?;
        container.start()?;
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response, Transport};
    use std::io;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Unused;

    impl Transport for Unused {
        fn send(&self, _request: Request) -> io::Result<Response> {
            Err(io::Error::other("no requests expected"))
        }
    }

    fn image(uri: &str) -> (Docker, Image) {
        let transport: SharedTransport = Arc::new(Unused);
        let docker = Docker::new(transport.clone(), Url::parse("http://localhost/v1.45").unwrap());
        let img = Image::new(JsonObject::new(), Url::parse(uri).unwrap(), transport, &docker);
        (docker, img)
    }

    #[test]
    fn test_reference_from_uri() {
        assert_eq!(image("http://localhost/images/image123").1.reference(), "image123");
        assert_eq!(
            image("http://localhost/v1.45/images/library/ubuntu:22.04").1.reference(),
            "library/ubuntu:22.04"
        );
        assert_eq!(
            image("http://localhost/v1.45/images/sha256%3Aabc").1.reference(),
            "sha256:abc"
        );
    }

    #[test]
    fn test_run_without_client_is_detached() {
        let (docker, img) = image("http://localhost/v1.45/images/alpine");
        drop(docker);
        assert!(matches!(img.run(), Err(crate::DockerError::Detached)));
    }
}
