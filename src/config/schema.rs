//! Configuration schema definitions.
//!
//! The proxy is configured entirely from the command line. The flags are
//! validated once into a [`ProxyConfig`], which is immutable afterwards.

use axum::http::{
    HeaderValue, Uri,
    uri::{Authority, Scheme},
};
use std::str::FromStr;
use url::{Position, Url};

use crate::config::validation::ValidationError;

/// Root configuration for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// The single upstream every request is forwarded to.
    pub upstream: UpstreamTarget,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Body buffering limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Port from `--port`.
    pub port: u16,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl ListenerConfig {
    pub fn for_port(port: u16) -> Self {
        Self {
            port,
            bind_address: format!("0.0.0.0:{port}"),
        }
    }
}

/// Limits applied while bodies are buffered for inspection.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
}

/// Timeout configuration. `None` leaves the stack defaults (no timeout).
#[derive(Debug, Clone, Default)]
pub struct TimeoutConfig {
    /// Whole-exchange timeout, enforced by the server.
    pub request_secs: Option<u64>,

    /// Time allowed for the upstream to answer with response headers.
    pub upstream_secs: Option<u64>,
}

/// The fixed upstream destination.
///
/// Parsed once at startup; the scheme, authority and `Host` header value are
/// precomputed so rewriting an outbound request cannot fail.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    url: Url,
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
}

impl UpstreamTarget {
    /// Parse `--dest`. Only plain `http` upstreams are supported.
    pub fn parse(dest: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidDest {
            dest: dest.to_string(),
            reason,
        };

        let url = Url::parse(dest).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }

        let authority = Authority::from_str(&url[Position::BeforeHost..Position::AfterPort])
            .map_err(|e| invalid(e.to_string()))?;
        let host_header =
            HeaderValue::from_str(authority.as_str()).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            url,
            scheme: Scheme::HTTP,
            authority,
            host_header,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// `host[:port]` of the upstream.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value written into the outbound `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Absolute URL an incoming request is forwarded to.
    ///
    /// The incoming path replaces any path on the destination; it is not
    /// appended to it.
    pub fn resolve(&self, uri: &Uri) -> Url {
        let mut url = self.url.clone();
        url.set_path(uri.path());
        url.set_query(uri.query());
        url.set_fragment(None);
        url
    }
}
