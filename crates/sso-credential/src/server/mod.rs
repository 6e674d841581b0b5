//! Simple-auth token exchange service.
//!
//! Hosts the on-behalf-of exchange behind HTTP for clients that cannot hold
//! the client secret. Callers authenticate with their SSO token as a bearer
//! credential; the service holds the secret and the token cache.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::TokenCache;
use crate::client::AadTokenClient;
use crate::config::{AuthConfig, OboSettings};
use crate::credential::IdentityProvider;
use crate::error::AuthResult;

/// Shared state for service handlers.
pub struct AuthServiceState {
    /// Validated exchange settings.
    pub settings: OboSettings,
    /// Identity provider used for every exchange.
    pub provider: Arc<dyn IdentityProvider>,
    /// Access tokens shared across requests; keys include the user.
    pub cache: TokenCache,
}

/// Token exchange service.
pub struct AuthService {
    state: Arc<AuthServiceState>,
}

impl AuthService {
    /// Create a service that exchanges against the configured authority host.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` naming every missing field.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let settings = config.obo_settings()?;
        let provider = AadTokenClient::new(settings.clone(), config)?;
        Ok(Self::with_provider(settings, Arc::new(provider)))
    }

    /// Create a service over an explicit identity provider.
    #[must_use]
    pub fn with_provider(settings: OboSettings, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            state: Arc::new(AuthServiceState { settings, provider, cache: TokenCache::new() }),
        }
    }

    /// HTTP router for the service.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
    }

    /// Serve on `0.0.0.0:port` until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("Token exchange service listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("Token exchange service shut down");
        Ok(())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").field("settings", &self.state.settings).finish()
    }
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AuthServiceState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/token", post(handlers::handle_token))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
