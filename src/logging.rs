//! Stderr logging for the pipeline commands.
//!
//! The orchestrator owns stdout for protocol JSON, so every human-readable
//! line (including the ANSI-colored output shown in the build UI) goes to
//! stderr. Call [`init_tracing`] once at program start; subsequent calls are
//! silently ignored (the global subscriber can only be set once per
//! process).

use std::io;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global tracing subscriber.
///
/// `debug` lowers the default level from INFO to DEBUG, matching the
/// `source.debug` flag of the resource configuration. The `RUST_LOG`
/// environment variable takes precedence for fine-grained filtering.
pub fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .without_time()
                .with_writer(io::stderr),
        )
        .try_init()
        .ok();
}
