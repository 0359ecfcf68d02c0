//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the log filter from the environment or the verbosity flag
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Everything goes to stderr; stdout carries command output only
//! - Warnings are shown by default so overrides (e.g. fee factor) are visible

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV_VAR: &str = "AUT_LOG";

/// Filter used when `AUT_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "aut_cli=debug"
    } else {
        "aut_cli=warn"
    }
}

/// Install the global subscriber.
///
/// Calling it again is a no-op.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .try_init();
}
