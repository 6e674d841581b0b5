//! Token broker for hosts that cannot hold the client secret.
//!
//! The exchange itself happens on the simple-auth service; this side only
//! caches what the service hands back.

use std::sync::Arc;

use url::Url;

use crate::cache::{TokenCache, derive_cache_key};
use crate::client::SimpleAuthClient;
use crate::config::{AuthConfig, BrokerSettings};
use crate::error::{AuthError, AuthResult};
use crate::scopes::Scopes;
use crate::token::{AccessToken, SsoToken, UserInfo};

/// Supplies the current user's SSO token, typically from the host application.
#[async_trait::async_trait]
pub trait SsoTokenSource: Send + Sync {
    /// Raw SSO token for the signed-in user.
    async fn sso_token(&self) -> AuthResult<String>;
}

/// An SSO token known up front.
#[derive(Clone)]
pub struct StaticSsoToken(String);

impl StaticSsoToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl SsoTokenSource for StaticSsoToken {
    async fn sso_token(&self) -> AuthResult<String> {
        Ok(self.0.clone())
    }
}

/// Credential that delegates token exchange to a remote service.
pub struct RemoteTokenBroker {
    settings: BrokerSettings,
    source: Arc<dyn SsoTokenSource>,
    client: SimpleAuthClient,
    cache: TokenCache,
}

impl RemoteTokenBroker {
    /// Build a broker from configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `client_id`, `initiate_login_endpoint` or
    /// `simple_auth_endpoint` is missing.
    pub fn new(config: &AuthConfig, source: Arc<dyn SsoTokenSource>) -> AuthResult<Self> {
        let settings = config.broker_settings()?;
        let client = SimpleAuthClient::new(&settings, config)?;
        Ok(Self { settings, source, client, cache: TokenCache::new() })
    }

    /// Share an existing cache.
    #[must_use]
    pub fn with_cache(mut self, cache: TokenCache) -> Self {
        self.cache = cache;
        self
    }

    /// Get an access token for `scopes`.
    ///
    /// Empty scopes return the SSO token. Otherwise a fresh cached token is
    /// returned, or one request is made to the simple-auth service.
    pub async fn get_token(&self, scopes: &Scopes) -> AuthResult<AccessToken> {
        let sso_token = self.current_sso_token().await?;

        if sso_token.is_expired() {
            return Err(AuthError::token_expired("SSO token has already expired."));
        }

        if scopes.is_empty() {
            return Ok(sso_token.as_access_token().clone());
        }

        let key = derive_cache_key(
            sso_token.user_id(),
            &self.settings.client_id,
            sso_token.tenant_id(),
            scopes,
        );

        if let Some(token) = self.cache.get_fresh(&key).await {
            tracing::debug!(scopes = %scopes.to_scope_string(), "Access token cache hit");
            return Ok(token);
        }

        tracing::debug!(
            scopes = %scopes.to_scope_string(),
            "No fresh cached token, requesting from authentication server"
        );

        let token = self.client.fetch_token(sso_token.raw(), scopes).await?;
        self.cache.set(key, token.clone()).await;

        Ok(token)
    }

    /// URL of the page that starts interactive login for `scopes`.
    pub fn login_url(&self, scopes: &Scopes) -> AuthResult<String> {
        let mut url = Url::parse(&self.settings.initiate_login_endpoint).map_err(|e| {
            AuthError::InvalidConfiguration(format!(
                "initiate_login_endpoint in configuration is invalid: {e}."
            ))
        })?;

        url.query_pairs_mut()
            .append_pair("clientId", &self.settings.client_id)
            .append_pair("scope", &scopes.to_scope_string());

        Ok(url.into())
    }

    /// Identity of the signed-in user.
    pub async fn user_info(&self) -> AuthResult<UserInfo> {
        Ok(self.current_sso_token().await?.user_info())
    }

    async fn current_sso_token(&self) -> AuthResult<SsoToken> {
        let raw = self.source.sso_token().await?;
        SsoToken::parse(&raw)
            .map_err(|e| AuthError::internal(format!("Failed to decode SSO token: {e}")))
    }
}

#[async_trait::async_trait]
impl super::TokenCredential for RemoteTokenBroker {
    async fn get_token(&self, scopes: &Scopes) -> AuthResult<AccessToken> {
        Self::get_token(self, scopes).await
    }

    async fn user_info(&self) -> AuthResult<UserInfo> {
        Self::user_info(self).await
    }
}

impl std::fmt::Debug for RemoteTokenBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTokenBroker")
            .field("settings", &self.settings)
            .field("client", &self.client)
            .finish()
    }
}
