//! Shared tracing subscriber setup for binaries (`qa-cli`, `qa-serve`'s standalone server).
//! Optional (`tracing-init` feature) to keep this crate lean for library-only consumers.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber` registry with an `EnvFilter` from `RUST_LOG`
/// (default `info`) and an stderr-writing fmt layer. Safe to call once at process start.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .try_init();
}
