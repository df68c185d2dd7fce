//! Upstream response hook.
//!
//! Runs between the upstream call and the relay to the client: buffers the
//! response body, logs it with the status line, and swaps in a replayed body.

use axum::body::{Body, Bytes};
use axum::http::Response;
use hyper::body::Body as HttpBody;
use hyper::ext::ReasonPhrase;

use crate::http::inspect::{inspect, InspectError};
use crate::observability::logging::BodyLogger;

/// Inspects and logs every upstream response.
#[derive(Debug, Clone)]
pub struct ResponseInterceptor {
    logger: BodyLogger,
    max_body_bytes: usize,
}

impl ResponseInterceptor {
    pub fn new(logger: BodyLogger, max_body_bytes: usize) -> Self {
        Self {
            logger,
            max_body_bytes,
        }
    }

    /// Returns the response with a replayable body, or the read error that
    /// must abort the relay.
    pub async fn intercept<B>(&self, response: Response<B>) -> Result<Response<Body>, InspectError>
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = response.into_parts();
        let inspected = match inspect(body, self.max_body_bytes).await {
            Ok(inspected) => inspected,
            Err(e) => {
                self.logger.error("Failed to read upstream response body", &e);
                return Err(e);
            }
        };

        let response = Response::from_parts(parts, inspected.replay());
        self.logger.response(&status_line(&response), &inspected);
        Ok(response)
    }
}

/// Status code plus reason phrase.
///
/// The upstream's own phrase wins when hyper kept one; otherwise the
/// canonical phrase is used, and an unknown code is logged bare.
pub fn status_line<B>(response: &Response<B>) -> String {
    let code = response.status();
    let reason = response
        .extensions()
        .get::<ReasonPhrase>()
        .filter(|reason| !reason.as_bytes().is_empty());
    match reason {
        Some(reason) => format!("{} {}", code.as_str(), String::from_utf8_lossy(reason.as_bytes())),
        None => match code.canonical_reason() {
            Some(reason) => format!("{} {reason}", code.as_str()),
            None => code.as_str().to_string(),
        },
    }
}
