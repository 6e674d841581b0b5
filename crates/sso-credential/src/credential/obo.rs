//! On-behalf-of credential for server-side code holding the client secret.

use std::sync::Arc;

use crate::cache::{TokenCache, derive_assertion_bound_cache_key, derive_cache_key};
use crate::client::AadTokenClient;
use crate::config::{AuthConfig, OboSettings};
use crate::error::{AuthError, AuthResult};
use crate::scopes::Scopes;
use crate::token::{AccessToken, SsoToken, UserInfo};

use super::provider::IdentityProvider;

/// Exchanges a user's SSO token for scoped access tokens.
///
/// Configuration is validated and the SSO token decoded when the credential
/// is built, so a credential that exists is always usable until its SSO token
/// expires.
pub struct OnBehalfOfCredential {
    settings: OboSettings,
    sso_token: SsoToken,
    provider: Arc<dyn IdentityProvider>,
    cache: TokenCache,
    bind_to_assertion: bool,
}

impl OnBehalfOfCredential {
    /// Build a credential that talks to the configured authority host.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` naming every missing field, or `InternalError`
    /// if the SSO token cannot be decoded.
    pub fn new(config: &AuthConfig, sso_token: &str) -> AuthResult<Self> {
        let settings = config.obo_settings()?;
        let provider = AadTokenClient::new(settings.clone(), config)?;
        Self::with_provider(settings, sso_token, Arc::new(provider), TokenCache::new())
    }

    /// Build a credential over an explicit provider and a shared cache.
    ///
    /// # Errors
    ///
    /// `InternalError` if the SSO token cannot be decoded.
    pub fn with_provider(
        settings: OboSettings,
        sso_token: &str,
        provider: Arc<dyn IdentityProvider>,
        cache: TokenCache,
    ) -> AuthResult<Self> {
        let sso_token = SsoToken::parse(sso_token).map_err(|e| {
            AuthError::internal(format!("Failed to decode SSO token: {e}"))
        })?;

        Ok(Self { settings, sso_token, provider, cache, bind_to_assertion: false })
    }

    /// Key cache entries by the raw SSO token as well as its claims.
    ///
    /// Required when the cache is shared between callers whose tokens are not
    /// verified before they reach this credential.
    #[must_use]
    pub fn bind_cache_to_assertion(mut self) -> Self {
        self.bind_to_assertion = true;
        self
    }

    /// Get an access token for `scopes`.
    ///
    /// Empty scopes return the SSO token itself without a network call.
    pub async fn get_token(&self, scopes: &Scopes) -> AuthResult<AccessToken> {
        if self.sso_token.is_expired() {
            tracing::warn!(user = %self.sso_token.user_id(), "SSO token has already expired");
            return Err(AuthError::token_expired("SSO token has already expired."));
        }

        if scopes.is_empty() {
            tracing::debug!("Empty scopes, returning SSO token");
            return Ok(self.sso_token.as_access_token().clone());
        }

        let key = if self.bind_to_assertion {
            derive_assertion_bound_cache_key(
                self.sso_token.user_id(),
                &self.settings.client_id,
                self.tenant_id(),
                scopes,
                self.sso_token.raw(),
            )
        } else {
            derive_cache_key(
                self.sso_token.user_id(),
                &self.settings.client_id,
                self.tenant_id(),
                scopes,
            )
        };

        if let Some(token) = self.cache.get_fresh(&key).await {
            tracing::debug!(scopes = %scopes.to_scope_string(), "Access token cache hit");
            return Ok(token);
        }

        tracing::debug!(scopes = %scopes.to_scope_string(), "Acquiring token on behalf of user");

        let issued = self
            .provider
            .acquire_token_on_behalf_of(self.sso_token.raw(), scopes)
            .await
            .map_err(|e| {
                tracing::warn!(kind = ?e.kind, error = %e, "On-behalf-of exchange failed");
                AuthError::from(e)
            })?
            .ok_or_else(|| AuthError::internal("Access token is null"))?;

        let token = AccessToken::new(issued.access_token, issued.expires_on);
        self.cache.set(key, token.clone()).await;

        tracing::info!(
            scopes = %scopes.to_scope_string(),
            expires_on = token.expires_on_timestamp,
            "Acquired access token on behalf of user"
        );

        Ok(token)
    }

    /// Identity of the user the SSO token was issued to.
    #[must_use]
    pub fn user_info(&self) -> UserInfo {
        self.sso_token.user_info()
    }

    /// The decoded SSO token.
    #[must_use]
    pub const fn sso_token(&self) -> &SsoToken {
        &self.sso_token
    }

    /// Tenant from the SSO token, falling back to the configured tenant.
    fn tenant_id(&self) -> &str {
        match self.sso_token.tenant_id() {
            "" => &self.settings.tenant_id,
            tid => tid,
        }
    }
}

#[async_trait::async_trait]
impl super::TokenCredential for OnBehalfOfCredential {
    async fn get_token(&self, scopes: &Scopes) -> AuthResult<AccessToken> {
        Self::get_token(self, scopes).await
    }

    async fn user_info(&self) -> AuthResult<UserInfo> {
        Ok(Self::user_info(self))
    }
}

impl std::fmt::Debug for OnBehalfOfCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnBehalfOfCredential")
            .field("settings", &self.settings)
            .field("sso_token", &self.sso_token)
            .finish()
    }
}
