//! Structured logging.
//!
//! # Responsibilities
//! - Build the JSON log sink once at startup
//! - Emit the startup, per-request, per-response and error records
//!
//! # Design Decisions
//! - The sink is a [`BodyLogger`] value handed to each component; no global
//!   subscriber is installed, so tests can run several sinks side by side
//! - One flat JSON object per line (see [`JsonLines`]), minimum level
//!   `info` unless `RUST_LOG` says otherwise
//! - A decoded body is nested in the record as a JSON object; a body that
//!   failed to decode is logged as text next to a `decode_error` field

use axum::http::Method;
use std::fmt;
use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, layer::SubscriberExt};
use url::Url;

use crate::http::inspect::Inspected;
use crate::observability::format::JsonLines;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Handle to the process log sink.
///
/// Cloning is cheap; all clones write to the same sink.
#[derive(Clone)]
pub struct BodyLogger {
    dispatch: Dispatch,
}

impl BodyLogger {
    /// JSON records on standard output.
    pub fn stdout() -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        Self::with_writer(std::io::stdout, filter)
    }

    /// JSON records on an arbitrary writer.
    pub fn with_writer<W>(writer: W, filter: EnvFilter) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .event_format(JsonLines)
                .with_writer(writer),
        );
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Run `f` with this sink as the current subscriber.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// `dest` is the destination exactly as the operator gave it.
    pub fn startup(&self, port: u16, dest: &str) {
        self.in_scope(|| tracing::info!(port, dest, "Starting server"));
    }

    /// Record an inbound request that is about to be forwarded.
    pub fn request(&self, method: &Method, url: &Url, inspected: &Inspected) {
        let body = inspected.logged_body();
        self.in_scope(|| match inspected.decode_error() {
            None => tracing::info!(body_object = %body, method = %method, url = %url, "request"),
            Some(decode_error) => tracing::info!(
                body = %body,
                decode_error = %decode_error,
                method = %method,
                url = %url,
                "request"
            ),
        });
    }

    /// Record an upstream response that is about to be relayed.
    ///
    /// `status` is the full status line, e.g. `"200 OK"`.
    pub fn response(&self, status: &str, inspected: &Inspected) {
        let body = inspected.logged_body();
        self.in_scope(|| match inspected.decode_error() {
            None => tracing::info!(body_object = %body, status, "response"),
            Some(decode_error) => tracing::info!(
                body = %body,
                decode_error = %decode_error,
                status,
                "response"
            ),
        });
    }

    pub fn error(&self, context: &str, error: &dyn fmt::Display) {
        self.in_scope(|| tracing::error!(error = %error, "{context}"));
    }
}

impl fmt::Debug for BodyLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyLogger").finish_non_exhaustive()
    }
}
