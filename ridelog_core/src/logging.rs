//! Logging infrastructure for ridelog.
//!
//! Components emit diagnostics through `tracing` macros only; nothing here
//! is global until a binary opts in by calling one of the init functions.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at the default `info` level
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with the given default level.
///
/// `RUST_LOG` still takes precedence when set, so a deployed binary can be
/// turned up to `debug` without a rebuild.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
