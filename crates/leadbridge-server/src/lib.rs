//! HTTP surface for the leadbridge OAuth bridge.
//!
//! Exposes the login round trip (`/login`, `/callback`), a webhook receiver,
//! and authenticated passthroughs to the CRM API (`/me`, `/contacts`).
//!
//! # Example
//!
//! ```ignore
//! use leadbridge_oauth::{AuthFlow, FileTokenStore, OAuthConfig};
//! use leadbridge_server::{Server, ServerConfig};
//!
//! let flow = AuthFlow::new(oauth_config, store)?;
//! flow.bootstrap().await;
//!
//! let server = Server::new(flow, ServerConfig::default());
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use leadbridge_oauth::AuthFlow;

/// The leadbridge HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given flow controller and configuration.
    pub fn new(flow: AuthFlow, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(flow, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        Router::new()
            .merge(routes::health_routes())
            .route("/", get(routes::root_handler))
            .route("/login", get(routes::login_handler))
            .route("/callback", get(routes::callback_handler))
            .route("/webhook", post(routes::webhook_handler))
            .route("/me", get(routes::me_handler))
            .route("/contacts", get(routes::contacts_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
