//! Optional stderr logging for the library and the CLI.
//!
//! Filter comes from `DOCKER_FACADE_LOG`, then `RUST_LOG`, defaulting to `warn`.
//! Spans are emitted around every daemon exchange at `debug`.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

fn filter_directives() -> String {
    ["DOCKER_FACADE_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|k| env::var(k).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "warn".to_string())
}

/// Install the global subscriber once. Returns false when already initialized here or
/// when another subscriber was installed first.
pub fn telemetry_init() -> bool {
    if INIT.get().is_some() {
        return false;
    }

    let env_filter = EnvFilter::try_new(filter_directives()).unwrap_or_else(|e| {
        eprintln!("docker-facade: invalid log filter ({e}); using \"warn\"");
        EnvFilter::new("warn")
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        return false;
    }

    INIT.set(()).is_ok()
}
