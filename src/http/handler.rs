//! Inbound request entry point.
//!
//! Buffers and logs the request body, then hands the request to the
//! [`ProxyCore`]. A body that cannot be read is answered here and never
//! reaches the upstream; a body that is merely not JSON is forwarded.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProxyConfig;
use crate::http::inspect::{inspect, InspectError};
use crate::http::interceptor::ResponseInterceptor;
use crate::http::proxy::ProxyCore;
use crate::observability::logging::BodyLogger;

#[derive(Debug, Clone)]
pub struct RequestHandler {
    proxy: ProxyCore,
    logger: BodyLogger,
    max_body_bytes: usize,
}

impl RequestHandler {
    pub fn new(proxy: ProxyCore, logger: BodyLogger, max_body_bytes: usize) -> Self {
        Self {
            proxy,
            logger,
            max_body_bytes,
        }
    }

    /// Wire a handler, proxy core and response interceptor from config.
    pub fn from_config(config: &ProxyConfig, logger: BodyLogger) -> Self {
        let max_body_bytes = config.limits.max_body_bytes;
        let interceptor = ResponseInterceptor::new(logger.clone(), max_body_bytes);
        let proxy = ProxyCore::new(
            Arc::new(config.upstream.clone()),
            interceptor,
            logger.clone(),
            config.timeouts.upstream_secs.map(Duration::from_secs),
        );
        Self::new(proxy, logger, max_body_bytes)
    }

    pub async fn handle(&self, peer: Option<SocketAddr>, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let inspected = match inspect(body, self.max_body_bytes).await {
            Ok(inspected) => inspected,
            Err(e) => {
                self.logger.error("Failed to read request body", &e);
                return (rejection_status(&e), e.to_string()).into_response();
            }
        };

        let request = Request::from_parts(parts, inspected.replay());
        let url = self.proxy.target().resolve(request.uri());
        self.logger.request(request.method(), &url, &inspected);

        self.proxy.forward(peer, request).await
    }
}

fn rejection_status(error: &InspectError) -> StatusCode {
    match error {
        InspectError::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        InspectError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
    }
}
