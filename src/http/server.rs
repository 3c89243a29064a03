//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router hosting the handler graph
//! - Wire up middleware (routing, timeout, tracing)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::middleware::class_router_middleware;
use crate::routing::{ClassRouter, HandlerRef};

/// HTTP server exposing a handler graph.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    class_router: Arc<ClassRouter>,
}

impl HttpServer {
    /// Create a server routing into the graph rooted at `root`.
    pub fn new(config: ServerConfig, root: HandlerRef) -> Self {
        let class_router = Arc::new(ClassRouter::builder(root).config(&config.routing).build());
        let router = Self::build_router(&config, class_router.clone());
        Self {
            router,
            config,
            class_router,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, class_router: Arc<ClassRouter>) -> Router {
        Router::new()
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(class_router, class_router_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            named_routes = self.class_router.named_route_count(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Axum router, for embedding or driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn class_router(&self) -> &Arc<ClassRouter> {
        &self.class_router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Reached when the handler graph passes a request through.
async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "No handler for this path")
}
