//! Body-logging reverse proxy library.
//!
//! Forwards every request to one upstream and logs request and response
//! bodies as JSON lines.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use error::{BootstrapError, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::BodyLogger;
