//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! client request
//!     → server.rs (Axum router, catch-all route)
//!     → handler.rs (inspect.rs on the request body, request log)
//!     → proxy.rs (director.rs rewrite, upstream call)
//!     → interceptor.rs (inspect.rs on the response body, response log)
//!     → client response
//! ```

pub mod director;
pub mod handler;
pub mod inspect;
pub mod interceptor;
pub mod proxy;
pub mod server;

pub use handler::RequestHandler;
pub use inspect::{inspect, DecodeError, InspectError, Inspected};
pub use proxy::ProxyCore;
pub use server::HttpServer;
