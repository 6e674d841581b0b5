//! Client for the simple-auth token exchange service.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{AuthConfig, BrokerSettings, api};
use crate::error::{AuthError, AuthResult};
use crate::scopes::Scopes;
use crate::token::AccessToken;

use super::{build_http_client, send_logged};

/// Request body for `POST /auth/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchangeRequest {
    /// Space-delimited scopes.
    pub scope: String,
    /// Always `sso_token`.
    pub grant_type: String,
}

/// Error body returned by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    /// Exception type, e.g. `AadUiRequiredException`.
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Stable error code.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// HTTP client for the remote token endpoint.
#[derive(Clone)]
pub struct SimpleAuthClient {
    http: Client,
    token_url: String,
}

impl SimpleAuthClient {
    /// Create a client for the configured service.
    pub fn new(settings: &BrokerSettings, config: &AuthConfig) -> AuthResult<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            token_url: format!("{}/{}", settings.simple_auth_endpoint, api::SIMPLE_AUTH_TOKEN_PATH),
        })
    }

    /// Exchange `sso_token` for a token carrying `scopes`.
    ///
    /// # Errors
    ///
    /// `UiRequired` for any 4xx answer (the user has not logged in or
    /// consented yet), `Service` for 5xx and transport failures.
    pub async fn fetch_token(&self, sso_token: &str, scopes: &Scopes) -> AuthResult<AccessToken> {
        let body = TokenExchangeRequest {
            scope: scopes.to_scope_string(),
            grant_type: api::SSO_TOKEN_GRANT_TYPE.to_string(),
        };

        let request = self.http.post(&self.token_url).bearer_auth(sso_token).json(&body);
        let response = send_logged(request, "simple_auth_token").await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<AccessToken>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ServiceErrorBody>(&text)
            .map(|b| b.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(text);

        if status.is_client_error() {
            return Err(AuthError::ui_required(format!(
                "Failed to get access token from authentication server, please login first: {detail}"
            )));
        }

        Err(AuthError::service(format!(
            "Failed to get access token from authentication server ({}): {detail}",
            status.as_u16()
        )))
    }
}

impl std::fmt::Debug for SimpleAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleAuthClient").field("token_url", &self.token_url).finish()
    }
}
