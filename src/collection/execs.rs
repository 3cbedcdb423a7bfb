use url::Url;

use super::Collection;
use crate::docker::DockerRef;
use crate::errors::Result;
use crate::http::{Method, SharedTransport};
use crate::resource::Exec;
use crate::validate::Operation;

/// Exec sessions, addressed by id under `/exec`.
#[derive(Clone, Debug)]
pub struct Execs {
    collection: Collection,
}

impl Execs {
    pub(crate) fn new(base: Url, transport: SharedTransport, docker: DockerRef) -> Self {
        Self {
            collection: Collection::new(base, transport, docker),
        }
    }

    pub fn uri(&self) -> &Url {
        self.collection.uri()
    }

    /// Resolve exec session `id`: inspects it once and returns a facade holding the
    /// full identity.
    pub fn get(&self, id: &str) -> Result<Exec> {
        let probe = self.collection.unverified(id);
        let identity = probe.call_json(Operation::ExecInspect, Method::Get, "/json", &[], None)?;
        Ok(Exec::from_resource(self.collection.resource(id, identity)))
    }
}
