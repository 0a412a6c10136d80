//! HTTP server wiring for the REST surface.

use std::net::SocketAddr;

use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use zapline_core::config::AppConfig;

use crate::handlers::AppState;
use crate::router::api_router;

/// Serves the dashboard REST API.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Starts the HTTP server; blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = api_router(self.state.clone())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);
        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
