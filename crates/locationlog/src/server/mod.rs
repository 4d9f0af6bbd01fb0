//! HTTP server for locationlog.
//!
//! Combines the location routes with cross-origin handling and request
//! tracing, and runs them on a tokio listener.
//!
//! # Endpoints
//!
//! - `POST /api/location` - store a reading
//! - `GET /api/location/last` - newest reading
//! - `OPTIONS` on either path - empty `200`

pub mod cors;
pub mod routes;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::storage::LocationStore;

pub use routes::{ApiError, SavedResponse, LAST_LOCATION_PATH, LOCATION_PATH};

/// Build the full application router over the given store.
pub fn build_router(store: Arc<LocationStore>) -> Router {
    cors::apply(routes::location_routes(store))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the location API.
#[derive(Debug)]
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over an already opened store.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<LocationStore>) -> Self {
        Self {
            config,
            router: build_router(store),
        }
    }

    /// Get the `host:port` this server will listen on.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing).
    #[must_use]
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind the listener and serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if the address cannot be bound, or an I/O
    /// error if serving fails.
    pub async fn run(self) -> Result<()> {
        let addr = self.socket_addr();
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| Error::Bind {
                addr: addr.clone(),
                source,
            })?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("Location server listening on http://{}", local_addr);
        info!("  POST {}", LOCATION_PATH);
        info!("  GET  {}", LAST_LOCATION_PATH);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Location server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
