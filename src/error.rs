//! Error kinds that cross subsystem boundaries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;
use crate::http::inspect::InspectError;
use crate::net::listener::ListenerError;

/// Failure forwarding a single request. Never affects other requests.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connecting to or talking with the upstream failed.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The upstream did not produce response headers in time.
    #[error("Upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// The upstream response body could not be buffered for relay.
    #[error("Upstream response could not be read: {0}")]
    Response(#[source] InspectError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) | ProxyError::Response(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Body sent to the client; upstream details stay in the log.
    fn client_message(&self) -> &'static str {
        match self {
            ProxyError::Upstream(_) => "Upstream request failed",
            ProxyError::UpstreamTimeout(_) => "Upstream request timed out",
            ProxyError::Response(_) => "Upstream response could not be read",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}

/// Fatal startup or serving failure. The process exits non-zero.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
