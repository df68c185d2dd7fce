//! Outbound request rewrite.
//!
//! Points a request at the upstream: scheme, authority and `Host` change;
//! method, path, query and all other headers are left as they are.

use axum::http::{header, uri::PathAndQuery, Request, Uri};

use crate::config::UpstreamTarget;

/// Rewrite `request` to target the upstream. Performs no I/O.
pub fn direct<B>(request: &mut Request<B>, target: &UpstreamTarget) {
    let original = request.uri().clone();
    let mut parts = original.clone().into_parts();
    parts.scheme = Some(target.scheme().clone());
    parts.authority = Some(target.authority().clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    *request.uri_mut() = Uri::from_parts(parts).unwrap_or(original);

    request
        .headers_mut()
        .insert(header::HOST, target.host_header().clone());
}
