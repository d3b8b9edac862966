//! Diagnostic output setup
//!
//! Diagnostics go to stderr through `tracing`, while the job's products
//! (configuration printout, cutflow report, event outcomes) go to stdout and
//! files. `RUST_LOG` takes precedence over the verbosity requested by the
//! configuration.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// Without `RUST_LOG`, only warnings are shown, unless `verbose` requests the
/// per-event debug trace.
///
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
