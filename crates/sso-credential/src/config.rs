//! Configuration for the SSO credential core.

use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Credential configuration constants.
pub mod api {
    use std::time::Duration;

    /// Remaining lifetime at or below which a cached token is refreshed (5 minutes).
    pub const NEAR_EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

    /// Prefix for access token cache keys.
    pub const ACCESS_TOKEN_CACHE_KEY_PREFIX: &str = "accessToken";

    /// Token endpoint path below `{authority_host}/{tenant_id}`.
    pub const TOKEN_ENDPOINT_PATH: &str = "oauth2/v2.0/token";

    /// Token endpoint path on the simple-auth service.
    pub const SIMPLE_AUTH_TOKEN_PATH: &str = "auth/token";

    /// Grant type sent by the broker to the simple-auth service.
    pub const SSO_TOKEN_GRANT_TYPE: &str = "sso_token";

    /// Request timeout for identity provider and simple-auth calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Environment variable names read by [`AuthConfig::from_env`].
pub mod env {
    /// Application (client) ID.
    pub const CLIENT_ID: &str = "M365_CLIENT_ID";
    /// Client secret for the confidential client.
    pub const CLIENT_SECRET: &str = "M365_CLIENT_SECRET";
    /// Directory (tenant) ID.
    pub const TENANT_ID: &str = "M365_TENANT_ID";
    /// Authority host, e.g. `https://login.microsoftonline.com`.
    pub const AUTHORITY_HOST: &str = "M365_AUTHORITY_HOST";
    /// Page that starts interactive login.
    pub const INITIATE_LOGIN_ENDPOINT: &str = "INITIATE_LOGIN_ENDPOINT";
    /// Base URL of the simple-auth token exchange service.
    pub const SIMPLE_AUTH_ENDPOINT: &str = "SIMPLE_AUTH_ENDPOINT";
}

/// Authentication configuration.
///
/// Every field is optional here; each credential validates the subset it needs
/// when it is constructed.
#[derive(Clone)]
pub struct AuthConfig {
    /// Application (client) ID.
    pub client_id: Option<String>,

    /// Client secret (server side only).
    pub client_secret: Option<String>,

    /// Directory (tenant) ID.
    pub tenant_id: Option<String>,

    /// Authority host URL.
    pub authority_host: Option<String>,

    /// Interactive login start page (browser side).
    pub initiate_login_endpoint: Option<String>,

    /// Simple-auth service base URL (browser side).
    pub simple_auth_endpoint: Option<String>,

    /// HTTP request timeout.
    pub request_timeout: Duration,

    /// HTTP connection timeout.
    pub connect_timeout: Duration,
}

impl AuthConfig {
    /// Create an empty configuration with default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant_id: None,
            authority_host: None,
            initiate_login_endpoint: None,
            simple_auth_endpoint: None,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset or empty variables leave the field absent.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            client_id: read(env::CLIENT_ID),
            client_secret: read(env::CLIENT_SECRET),
            tenant_id: read(env::TENANT_ID),
            authority_host: read(env::AUTHORITY_HOST),
            initiate_login_endpoint: read(env::INITIATE_LOGIN_ENDPOINT),
            simple_auth_endpoint: read(env::SIMPLE_AUTH_ENDPOINT),
            ..Self::new()
        }
    }

    /// Create a test configuration pointing both endpoints at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            client_id: Some("fake-client-id".to_string()),
            client_secret: Some("fake-client-secret".to_string()),
            tenant_id: Some("fake-tenant-id".to_string()),
            authority_host: Some(base_url.to_string()),
            initiate_login_endpoint: Some(format!("{base_url}/auth-start.html")),
            simple_auth_endpoint: Some(base_url.to_string()),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Set the client ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the tenant ID.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the authority host.
    #[must_use]
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = Some(host.into());
        self
    }

    /// Set the interactive login endpoint.
    #[must_use]
    pub fn with_initiate_login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.initiate_login_endpoint = Some(endpoint.into());
        self
    }

    /// Set the simple-auth service endpoint.
    #[must_use]
    pub fn with_simple_auth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.simple_auth_endpoint = Some(endpoint.into());
        self
    }

    /// Validate the settings the on-behalf-of exchanger needs.
    ///
    /// Fails with `InvalidConfiguration` naming every missing field.
    pub fn obo_settings(&self) -> AuthResult<OboSettings> {
        let mut missing = Vec::new();
        let client_id = require(self.client_id.as_deref(), "client_id", &mut missing);
        let authority_host = require(self.authority_host.as_deref(), "authority_host", &mut missing);
        let client_secret = require(self.client_secret.as_deref(), "client_secret", &mut missing);
        let tenant_id = require(self.tenant_id.as_deref(), "tenant_id", &mut missing);

        match (client_id, authority_host, client_secret, tenant_id) {
            (Some(client_id), Some(authority_host), Some(client_secret), Some(tenant_id)) => {
                Ok(OboSettings {
                    client_id,
                    authority_host: authority_host.trim_end_matches('/').to_string(),
                    client_secret,
                    tenant_id,
                })
            }
            _ => Err(AuthError::missing_configuration(&missing)),
        }
    }

    /// Validate the settings the remote token broker needs.
    pub fn broker_settings(&self) -> AuthResult<BrokerSettings> {
        let mut missing = Vec::new();
        let client_id = require(self.client_id.as_deref(), "client_id", &mut missing);
        let initiate_login_endpoint =
            require(self.initiate_login_endpoint.as_deref(), "initiate_login_endpoint", &mut missing);
        let simple_auth_endpoint =
            require(self.simple_auth_endpoint.as_deref(), "simple_auth_endpoint", &mut missing);

        match (client_id, initiate_login_endpoint, simple_auth_endpoint) {
            (Some(client_id), Some(initiate_login_endpoint), Some(simple_auth_endpoint)) => {
                Ok(BrokerSettings {
                    client_id,
                    initiate_login_endpoint,
                    simple_auth_endpoint: simple_auth_endpoint.trim_end_matches('/').to_string(),
                })
            }
            _ => Err(AuthError::missing_configuration(&missing)),
        }
    }
}

fn require(
    value: Option<&str>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            missing.push(name);
            None
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.client_secret.is_some())
            .field("tenant_id", &self.tenant_id)
            .field("authority_host", &self.authority_host)
            .field("initiate_login_endpoint", &self.initiate_login_endpoint)
            .field("simple_auth_endpoint", &self.simple_auth_endpoint)
            .finish()
    }
}

/// Validated settings for the on-behalf-of exchanger.
#[derive(Clone)]
pub struct OboSettings {
    /// Application (client) ID.
    pub client_id: String,
    /// Authority host without trailing slash.
    pub authority_host: String,
    /// Client secret.
    pub client_secret: String,
    /// Directory (tenant) ID.
    pub tenant_id: String,
}

impl OboSettings {
    /// Full token endpoint URL for this tenant.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/{}/{}", self.authority_host, self.tenant_id, api::TOKEN_ENDPOINT_PATH)
    }
}

impl std::fmt::Debug for OboSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OboSettings")
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Validated settings for the remote token broker.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    /// Application (client) ID.
    pub client_id: String,
    /// Interactive login start page.
    pub initiate_login_endpoint: String,
    /// Simple-auth service base URL without trailing slash.
    pub simple_auth_endpoint: String,
}
