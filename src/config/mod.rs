//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line
//!     → cli.rs (clap parse, unset flags default to empty/zero)
//!     → validation.rs (semantic checks, all errors at once)
//!     → ProxyConfig (validated, immutable)
//!     → UpstreamTarget shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Missing required flags are reported through the logger, not clap

pub mod cli;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use schema::{LimitsConfig, ListenerConfig, ProxyConfig, TimeoutConfig, UpstreamTarget};
pub use validation::{validate, ConfigError, ValidationError};
