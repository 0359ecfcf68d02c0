//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (EnvFilter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - Diagnostics never share stdout with command output
//! - Secrets are never recorded as fields

pub mod logging;

pub use logging::init_logging;
