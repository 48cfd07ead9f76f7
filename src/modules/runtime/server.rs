//! HTTP server for the portfolio backend

use axum::{
    routing::{get, put},
    Router,
};
use portfolio_core::{AppConfig, PortfolioError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::connectors::{DocumentStore, StoreManager};
use crate::handlers::{ContactsHandler, HealthHandler, ProjectsHandler, UsersHandler};
use crate::state::AppState;

/// Runtime server for the portfolio backend
pub struct Runtime {
    config: Arc<AppConfig>,
    store: Arc<StoreManager>,
}

impl Runtime {
    /// Create a runtime whose store connects when the server starts
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(StoreManager::new(config.database.ready_timeout()));
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Create a runtime around an already connected store
    pub fn with_store(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(StoreManager::ready(store)),
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let state = AppState::new(self.store.clone());

        // CORS configuration
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        // Request timeout
        let timeout = TimeoutLayer::new(self.config.server.request_timeout());

        Router::new()
            // Liveness and readiness
            .route("/", get(HealthHandler::liveness))
            .route("/health", get(HealthHandler::health))
            // Contacts
            .route(
                "/contacts",
                get(ContactsHandler::list).post(ContactsHandler::create),
            )
            // Users
            .route("/users", get(UsersHandler::list).post(UsersHandler::register))
            .route("/users/:email", get(UsersHandler::role))
            // Projects
            .route(
                "/projects",
                get(ProjectsHandler::list).post(ProjectsHandler::create),
            )
            .route(
                "/projects/:id",
                put(ProjectsHandler::update).delete(ProjectsHandler::delete),
            )
            .route("/projects/publish/:id", put(ProjectsHandler::publish))
            // State
            .with_state(state)
            // Middleware
            .layer(cors)
            .layer(timeout)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    ///
    /// The store connects in the background; requests arriving before it is
    /// ready wait for it, and get 503 if it fails.
    pub async fn run(&self) -> Result<(), PortfolioError> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.server.port)
            .parse()
            .map_err(|e| PortfolioError::Server(format!("Invalid address: {}", e)))?;

        if !self.store.is_ready() {
            info!(
                "Connecting to {} store at {}",
                self.config.database.backend,
                self.config.database.target()
            );
            let _ = self.store.spawn_initialize(self.config.database.clone());
        }

        let app = self.router();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| PortfolioError::Server(format!("Failed to bind: {}", e)))?;

        info!("Server is running on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .map_err(|e| PortfolioError::Server(format!("Server error: {}", e)))?;

        info!("Server stopped");
        self.shutdown().await?;

        Ok(())
    }

    /// Wait for shutdown signal
    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                debug!("Received CTRL+C, shutting down...");
            }
            _ = terminate => {
                debug!("Received SIGTERM, shutting down...");
            }
        }
    }

    /// Gracefully shutdown the runtime
    pub async fn shutdown(&self) -> Result<(), PortfolioError> {
        info!("Closing database connection...");
        if let Err(e) = self.store.close().await {
            warn!("Error closing store: {}", e);
        }
        info!("Shutdown complete");
        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the store handle
    pub fn store(&self) -> &Arc<StoreManager> {
        &self.store
    }
}
