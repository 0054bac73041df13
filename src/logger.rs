//! Tracing setup for the accompanying binaries.
//!
//! The library only emits events; installing a subscriber is the
//! caller's job, and this is the one the bundled CLI uses.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// An explicit `level` (from `--log-level`) wins over `RUST_LOG`;
/// with neither, `info` is the default. Call once, from `main`.
pub fn init(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
