//! Root client: owns the shared transport and the versioned base URI, hands out collections.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use url::Url;

use crate::collection::{Containers, Execs, Images};
use crate::config::{Config, DockerHost, DEFAULT_API_VERSION};
use crate::errors::{DockerError, Result};
use crate::http::{Method, RemoteTransport, SharedTransport, TcpTransport};
#[cfg(unix)]
use crate::http::UnixSocketTransport;
use crate::protocol::{discard, exchange, parse_object};
use crate::target;
use crate::validate::Operation;
use crate::JsonObject;

struct Shared {
    transport: SharedTransport,
    base: Url,
}

/// Entry point to a Docker daemon.
///
/// Cloning is cheap and yields a handle to the same client. Facades obtained from it
/// keep only a weak reference, so dropping every `Docker` handle ends the client even
/// while containers or images are still held.
#[derive(Clone)]
pub struct Docker {
    shared: Arc<Shared>,
}

/// Weak back-reference from facades and collections to the root client.
#[derive(Clone, Debug)]
pub(crate) struct DockerRef(Weak<Shared>);

impl DockerRef {
    pub(crate) fn upgrade(&self) -> Option<Docker> {
        self.0.upgrade().map(|shared| Docker { shared })
    }

    pub(crate) fn require(&self) -> Result<Docker> {
        self.upgrade().ok_or(DockerError::Detached)
    }
}

impl Docker {
    /// Client over `transport` with `base` as the versioned API root, e.g.
    /// `http://localhost/v1.45`.
    pub fn new(transport: SharedTransport, base: Url) -> Self {
        Self {
            shared: Arc::new(Shared { transport, base }),
        }
    }

    /// Local daemon on a Unix socket, default API version.
    #[cfg(unix)]
    pub fn unix(socket: impl Into<PathBuf>) -> Result<Self> {
        Self::from_config(&Config {
            host: DockerHost::Unix(socket.into()),
            ..Config::default()
        })
    }

    /// Daemon on a plain-HTTP TCP endpoint (`tcp://` or `http://`).
    pub fn tcp(url: &str) -> Result<Self> {
        match DockerHost::parse(url)? {
            host @ DockerHost::Tcp(_) => Self::from_config(&Config {
                host,
                ..Config::default()
            }),
            _ => Err(DockerError::Config(format!("{url:?} is not a tcp:// or http:// address"))),
        }
    }

    /// Daemon reached through reqwest, for `https://` (or `http://`) endpoints.
    pub fn remote(url: &str) -> Result<Self> {
        let url = match DockerHost::parse(url)? {
            DockerHost::Tcp(u) | DockerHost::Https(u) => u,
            DockerHost::Unix(_) => {
                return Err(DockerError::Config(format!("{url:?} is not a network address")))
            }
        };
        let transport = RemoteTransport::new(None)?;
        Ok(Self::new(Arc::new(transport), versioned(&url, DEFAULT_API_VERSION)))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let (transport, daemon): (SharedTransport, Url) = match &cfg.host {
            #[cfg(unix)]
            DockerHost::Unix(path) => {
                let transport = UnixSocketTransport::new(path.clone()).with_timeout(cfg.timeout);
                (Arc::new(transport), unix_authority()?)
            }
            #[cfg(not(unix))]
            DockerHost::Unix(_) => {
                return Err(DockerError::Config(
                    "unix sockets are not supported on this platform".to_string(),
                ))
            }
            DockerHost::Tcp(url) => (
                Arc::new(TcpTransport::new().with_timeout(cfg.timeout)),
                url.clone(),
            ),
            DockerHost::Https(url) => (Arc::new(RemoteTransport::new(cfg.timeout)?), url.clone()),
        };
        #[cfg(feature = "telemetry")]
        tracing::debug!(host = %cfg.host, api_version = %cfg.api_version, "docker client configured");
        Ok(Self::new(transport, versioned(&daemon, &cfg.api_version)))
    }

    /// Versioned API root every collection URI hangs off.
    pub fn base(&self) -> &Url {
        &self.shared.base
    }

    pub fn transport(&self) -> SharedTransport {
        Arc::clone(&self.shared.transport)
    }

    pub fn containers(&self) -> Containers {
        Containers::new(self.collection_uri("containers"), self.transport(), self.downgrade())
    }

    pub fn images(&self) -> Images {
        Images::new(self.collection_uri("images"), self.transport(), self.downgrade())
    }

    pub fn execs(&self) -> Execs {
        Execs::new(self.collection_uri("exec"), self.transport(), self.downgrade())
    }

    /// `GET /_ping`; succeeds only on 200.
    pub fn ping(&self) -> Result<()> {
        let resp = self.call(Operation::Ping, "/_ping")?;
        discard(resp)
    }

    pub fn version(&self) -> Result<JsonObject> {
        let uri = target::build(self.base(), "/version", &[]);
        let resp = self.call(Operation::Version, "/version")?;
        parse_object(resp, &uri)
    }

    pub fn info(&self) -> Result<JsonObject> {
        let uri = target::build(self.base(), "/info", &[]);
        let resp = self.call(Operation::Info, "/info")?;
        parse_object(resp, &uri)
    }

    pub(crate) fn downgrade(&self) -> DockerRef {
        DockerRef(Arc::downgrade(&self.shared))
    }

    fn collection_uri(&self, name: &str) -> Url {
        target::child(self.base(), name)
    }

    fn call(&self, operation: Operation, suffix: &str) -> Result<crate::http::Response> {
        let uri = target::build(self.base(), suffix, &[]);
        exchange(self.shared.transport.as_ref(), operation, Method::Get, uri, None)
    }
}

impl PartialEq for Docker {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for Docker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Docker")
            .field("base", &self.shared.base.as_str())
            .field("transport", &self.shared.transport)
            .finish()
    }
}

fn versioned(daemon: &Url, api_version: &str) -> Url {
    target::build(daemon, &format!("/v{api_version}"), &[])
}

// Authority placeholder for socket transports; only path and query reach the wire.
#[cfg(unix)]
fn unix_authority() -> Result<Url> {
    Url::parse("http://localhost").map_err(|e| DockerError::Config(e.to_string()))
}
