//! Single-host forwarding engine.
//!
//! # Responsibilities
//! - Rewrite the request toward the upstream (director)
//! - Strip hop-by-hop headers and record the client in `X-Forwarded-For`
//! - Call the upstream and relay the intercepted response
//!
//! # Design Decisions
//! - One pooled HTTP/1.1 client shared by all requests
//! - No retries; an upstream failure ends that request only

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderMap, HeaderValue, Request, Version},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::config::UpstreamTarget;
use crate::error::ProxyError;
use crate::http::director::direct;
use crate::http::interceptor::ResponseInterceptor;
use crate::observability::logging::BodyLogger;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Reverse proxy bound to one upstream.
#[derive(Debug, Clone)]
pub struct ProxyCore {
    target: Arc<UpstreamTarget>,
    client: Client<HttpConnector, Body>,
    interceptor: ResponseInterceptor,
    logger: BodyLogger,
    upstream_timeout: Option<Duration>,
}

impl ProxyCore {
    pub fn new(
        target: Arc<UpstreamTarget>,
        interceptor: ResponseInterceptor,
        logger: BodyLogger,
        upstream_timeout: Option<Duration>,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            target,
            client,
            interceptor,
            logger,
            upstream_timeout,
        }
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    /// Forward `request` upstream and return what the client should receive.
    pub async fn forward(&self, peer: Option<SocketAddr>, request: Request<Body>) -> Response {
        match self.try_forward(peer, request).await {
            Ok(response) => response,
            Err(e) => {
                // Interceptor failures were logged where they happened.
                if !matches!(e, ProxyError::Response(_)) {
                    self.logger.error("Upstream error", &e);
                }
                e.into_response()
            }
        }
    }

    async fn try_forward(
        &self,
        peer: Option<SocketAddr>,
        mut request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        direct(&mut request, &self.target);
        strip_hop_by_hop(request.headers_mut());
        if let Some(peer) = peer {
            append_forwarded_for(request.headers_mut(), peer.ip());
        }
        *request.version_mut() = Version::HTTP_11;

        let call = self.client.request(request);
        let response = match self.upstream_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(limit))??,
            None => call.await?,
        };

        let mut response = self
            .interceptor
            .intercept(response)
            .await
            .map_err(ProxyError::Response)?;
        strip_hop_by_hop(response.headers_mut());
        Ok(response.into_response())
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(axum::http::header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    let value = if prior.is_empty() {
        ip.to_string()
    } else {
        format!("{}, {ip}", prior.join(", "))
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_standard_and_listed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, x-session"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("x-session", HeaderValue::from_static("abc"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn forwarded_for_appends_to_existing_chain() {
        let mut headers = HeaderMap::new();
        append_forwarded_for(&mut headers, "10.0.0.1".parse().unwrap());
        assert_eq!(headers[&X_FORWARDED_FOR], "10.0.0.1");

        headers.append(&X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.2"));
        append_forwarded_for(&mut headers, "127.0.0.1".parse().unwrap());
        assert_eq!(
            headers.get_all(&X_FORWARDED_FOR).iter().count(),
            1,
            "chain collapses into one header"
        );
        assert_eq!(headers[&X_FORWARDED_FOR], "10.0.0.1, 10.0.0.2, 127.0.0.1");
    }
}
