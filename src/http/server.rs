//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the deferred handler and its resolution token
//! - Create Axum Router delegating every request to the deferred handler
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown

use std::path::PathBuf;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::deferred::DeferredHandler;
use crate::http::content;
use crate::lifecycle::Shutdown;

/// HTTP server fronting a deferred content handler.
pub struct HttpServer {
    router: Router,
    handler: DeferredHandler,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server and start resolving its content handler.
    ///
    /// Resolution is cancelled when `shutdown` triggers or when the configured
    /// `give_up_after_secs` deadline passes. Must be called from within a Tokio
    /// runtime.
    pub fn new(config: AppConfig, shutdown: &Shutdown) -> Self {
        let cancel = shutdown.child_with_deadline(config.deferred.give_up_after());
        let path: PathBuf = config.content.path.clone();

        let handler = DeferredHandler::new(
            cancel,
            move || {
                let path = path.clone();
                async move { content::build_router(&path).await }
            },
            config.deferred.to_options(),
        );

        let router = Self::build_router(handler.clone());
        Self {
            router,
            handler,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(handler: DeferredHandler) -> Router {
        Router::new()
            .fallback_service(handler)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            content = %self.config.content.path.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The deferred handler serving requests.
    pub fn handler(&self) -> &DeferredHandler {
        &self.handler
    }
}
