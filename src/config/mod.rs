//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config <file>, or .aut.toml in cwd/ancestors, or ~/.aut.toml
//!     → loader.rs (discover, read & deserialize)
//!     → validation.rs (semantic checks)
//!     → AutConfig (validated, immutable for the invocation)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Command-line flags and environment variables override file values

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{discover_config, load_config, load_or_default, ConfigError};
pub use schema::{AutConfig, RpcConfig, TransactionConfig};
pub use validation::ValidationError;
