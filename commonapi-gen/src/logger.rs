//! Logging setup for the command-line tool
//!
//! Installs a `tracing` subscriber writing to stderr and forwards records of
//! the `log` crate, which the parser and generator libraries log through.
//!
//! # Example
//!
//! ```no_run
//! use commonapi_gen::logger::{init_logging, level_for_verbosity};
//!
//! init_logging(level_for_verbosity(1));
//! log::debug!("visible with -v");
//! ```

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Default filter directive for a `-v` count
#[must_use]
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once has no effect.
pub fn init_logging(default_level: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        tracing_log::LogTracer::init().ok();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let fmt_layer = fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .ok();
    });
}
