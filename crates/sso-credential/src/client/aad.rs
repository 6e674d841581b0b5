//! Microsoft identity platform adapter for the on-behalf-of grant.

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::{AuthConfig, OboSettings};
use crate::credential::{IdentityProvider, ProviderError, ProviderErrorKind, ProviderToken};
use crate::error::AuthResult;
use crate::scopes::Scopes;
use crate::token::now_timestamp;

use super::{build_http_client, send_logged};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Provider message fragment for an assertion outside its validity window.
const ASSERTION_EXPIRED_CODE: &str = "AADSTS500133";

/// OAuth error codes that require interactive sign-in.
const INTERACTION_REQUIRED_ERRORS: &[&str] =
    &["interaction_required", "consent_required", "login_required"];

/// Provider suberrors that require interactive sign-in.
const INTERACTION_REQUIRED_SUBERRORS: &[&str] = &[
    "message_only",
    "additional_action",
    "basic_action",
    "user_password_expired",
    "consent_required",
];

/// Token endpoint client for a single tenant.
#[derive(Clone)]
pub struct AadTokenClient {
    http: Client,
    settings: OboSettings,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub suberror: Option<String>,
}

impl AadTokenClient {
    /// Create a client for the validated settings.
    pub fn new(settings: OboSettings, config: &AuthConfig) -> AuthResult<Self> {
        Ok(Self { http: build_http_client(config)?, settings })
    }

    fn form_body(&self, assertion: &str, scopes: &Scopes) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("client_secret", &self.settings.client_secret)
            .append_pair("assertion", assertion)
            .append_pair("scope", &scopes.to_scope_string())
            .append_pair("requested_token_use", "on_behalf_of")
            .finish()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for AadTokenClient {
    async fn acquire_token_on_behalf_of(
        &self,
        assertion: &str,
        scopes: &Scopes,
    ) -> Result<Option<ProviderToken>, ProviderError> {
        let request = self
            .http
            .post(self.settings.token_endpoint())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(self.form_body(assertion, scopes));

        let response = send_logged(request, "on_behalf_of")
            .await
            .map_err(|e| ProviderError::other(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ProviderError::other(e.to_string()))?;

        if !status.is_success() {
            let body: ErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            let kind = classify(&body);
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| format!("token endpoint returned {}: {text}", status.as_u16()));
            return Err(ProviderError::new(kind, message));
        }

        let body: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::other(format!("invalid token response: {e}")))?;

        let Some(access_token) = body.access_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let expires_in = body
            .expires_in
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .ok_or_else(|| ProviderError::other("token response is missing expires_in"))?;

        let expires_on = (expires_in >= 0)
            .then(|| now_timestamp().checked_add(expires_in))
            .flatten()
            .ok_or_else(|| {
                ProviderError::other(format!("token response has invalid expires_in: {expires_in}"))
            })?;

        Ok(Some(ProviderToken { access_token, expires_on }))
    }
}

/// Classify an OAuth error body.
pub(crate) fn classify(body: &ErrorResponse) -> ProviderErrorKind {
    let interaction = body
        .error
        .as_deref()
        .is_some_and(|e| INTERACTION_REQUIRED_ERRORS.contains(&e))
        || body.suberror.as_deref().is_some_and(|s| INTERACTION_REQUIRED_SUBERRORS.contains(&s));

    if interaction {
        ProviderErrorKind::InteractionRequired
    } else if body
        .error_description
        .as_deref()
        .is_some_and(|d| d.contains(ASSERTION_EXPIRED_CODE))
    {
        ProviderErrorKind::AssertionExpired
    } else {
        ProviderErrorKind::Other
    }
}

impl std::fmt::Debug for AadTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AadTokenClient").field("settings", &self.settings).finish()
    }
}
