/*!
Typed, synchronous client for the Docker Engine HTTP API.

```text
Docker ──containers()──▶ Containers ──get/list/create──▶ Container ──exec()──▶ Exec
       ──images()──────▶ Images     ──get/list/pull────▶ Image     ──run()───▶ Container
       ──execs()───────▶ Execs      ──get──────────────▶ Exec
```

Every operation is one (or, for `Container::exec` and `Image::run`, two) HTTP round
trips: build the target URI, send it through the client's [`http::Transport`], check
the status against the operation's accepted set ([`Operation::accepted`]) and decode
the body. A status outside that set is [`DockerError::UnexpectedResponse`] carrying the
observed code; callers branch on [`DockerError::status`].

Facades hold an immutable identity snapshot and a weak reference to the [`Docker`]
client that produced them. Call `inspect()` for fresh state.

Modules:
- [`config`]: `DOCKER_HOST` / `DOCKER_API_VERSION` / `DOCKER_CLIENT_TIMEOUT`
- [`http`]: request/response types and the Unix socket, TCP and HTTPS transports
- [`target`]: request URI construction and query encoding
- [`validate`]: per-operation accepted status codes
- [`errors`]: [`DockerError`] and exit-code mapping
*/

pub mod config;
pub mod errors;
pub mod http;
pub mod target;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod validate;

mod collection;
mod docker;
mod protocol;
mod resource;

/// A decoded JSON object as the daemon returned it. Field names are the daemon's.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use collection::{Containers, Execs, Images};
pub use config::{Config, DockerHost, DEFAULT_API_VERSION, DEFAULT_SOCKET};
pub use docker::Docker;
pub use errors::{exit_code_for_error, exit_code_for_io_error, DockerError, Result};
pub use resource::logs::{Frame, Frames, LogStream, Logs, StreamKind};
pub use resource::{Container, Exec, Image, RemoveOptions};
#[cfg(feature = "telemetry")]
pub use telemetry::telemetry_init;
pub use validate::Operation;
