//! Autonity command-line transaction core.
//!
//! Builds, signs, broadcasts and tracks EVM transactions for an Autonity
//! network, and wraps the protocol contracts used by validators and stakers.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────────────┐
//!                │                         aut                               │
//!   argv ───────▶│  cli ──▶ value (amounts, rates)                           │
//!                │   │                                                       │
//!                │   ├──▶ contract (Autonity, ERC20, Liquid call encoding)   │
//!                │   │                                                       │
//!                │   ├──▶ blockchain                                         │
//!                │   │      builder ──▶ finalize ──▶ broadcast ──▶ wait      │
//!                │   │           ╲          │            │                   │
//!                │   │            ╲         ▼            ▼                   │
//!                │   │             ──▶ ChainClient (alloy, timeouts) ────────┼──▶ RPC node
//!                │   │                                                       │
//!                │   └──▶ signing ──▶ auth::Authenticator                    │
//!                │                      ├── KeyfileAuthenticator (keystore)  │
//!                │                      └── HardwareAuthenticator (Trezor)   │
//!                │                                                          │
//!                │  config (.aut.toml)    observability (tracing → stderr)   │
//!                └──────────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod blockchain;
pub mod contract;
pub mod value;

// Keys and signatures
pub mod auth;
pub mod signing;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

// Command-line surface
pub mod cli;

pub use auth::{get_authenticator, AuthError, Authenticator};
pub use blockchain::{BlockchainClient, ChainClient, SignedTransaction, UnsignedTransaction};
pub use config::AutConfig;
pub use error::{CliError, CliResult};
