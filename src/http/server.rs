//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (request timeout)
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::config::ProxyConfig;
use crate::http::handler::RequestHandler;
use crate::observability::logging::BodyLogger;

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    logger: BodyLogger,
}

impl HttpServer {
    pub fn new(config: &ProxyConfig, logger: BodyLogger) -> Self {
        let handler = RequestHandler::from_config(config, logger.clone());
        let router = Self::build_router(config, handler);
        Self { router, logger }
    }

    /// Every method on `/` and every sub-path goes to the proxy handler.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, handler: RequestHandler) -> Router {
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(handler);

        match config.timeouts.request_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        self.logger
            .in_scope(|| tracing::info!("HTTP server stopped"));
        Ok(())
    }
}

async fn proxy_handler(
    State(handler): State<RequestHandler>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    handler.handle(Some(peer), request).await
}
