//! API server setup: middleware stack, listener, graceful shutdown.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::CasinoConfig;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

pub struct ApiServer {
    config: CasinoConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: CasinoConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Start the server and block until shutdown.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "duat_casino=info,tower_http=info".into()),
            )
            .init();

        // Bound session-store growth when clients abandon rounds.
        let reaper = self
            .state
            .sessions
            .clone()
            .spawn_reaper(self.config.sessions.sweep_interval());

        let app = self.create_app();
        let addr = self.socket_addr()?;

        info!("Starting Duat Casino server");
        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        reaper.abort();
        info!("Server stopped gracefully");
        Ok(())
    }

    /// Assemble the application with its middleware stack.
    fn create_app(&self) -> axum::Router {
        create_router(self.state.clone())
            // Request ID middleware (first, so everything below is traceable)
            .layer(axum::middleware::from_fn(request_id_middleware))
            // CORS (before timeout to handle preflight)
            .layer(create_cors_layer(&self.config.server.allowed_origins))
            // Per-request timeout
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.request_timeout_secs,
            )))
            // Request tracing
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        info!("Configuration:");
        info!("   CORS: {:?}", self.config.server.allowed_origins);
        info!("   Request timeout: {}s", self.config.server.request_timeout_secs);
        info!(
            "   Session expiry: {}s (sweep every {}s)",
            self.config.sessions.idle_timeout_secs, self.config.sessions.sweep_interval_secs
        );
        info!("Available endpoints:");
        info!("   GET  /health                 - Health check");
        info!("   POST /players/guest          - Guest registration");
        info!("   GET  /players/:id            - Player lookup");
        info!("   GET  /players/by-nickname    - Player lookup by nickname");
        info!("   POST /games/cards/play       - Card-slot round");
        info!("   POST /games/number/play      - Number-guess attempt");
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
