//! Token types and claim decoding.

mod access_token;
mod claims;

pub use access_token::AccessToken;
pub use claims::{ClaimsError, DecodedClaims, TokenVersion, UserType, parse_token};

use serde::Serialize;

/// Current time in epoch seconds.
#[must_use]
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Basic identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Display name.
    pub display_name: String,
    /// Object ID.
    pub object_id: String,
    /// User principal name or preferred user name.
    pub preferred_user_name: String,
}

impl From<&DecodedClaims> for UserInfo {
    fn from(claims: &DecodedClaims) -> Self {
        Self {
            display_name: claims.display_name.clone(),
            object_id: claims.object_id.clone(),
            preferred_user_name: claims.preferred_user_name.clone(),
        }
    }
}

/// An SSO token together with its decoded claims.
#[derive(Clone)]
pub struct SsoToken {
    token: AccessToken,
    claims: DecodedClaims,
}

impl SsoToken {
    /// Decode a raw SSO token. The `exp` claim is required.
    pub fn parse(raw: &str) -> Result<Self, ClaimsError> {
        let claims = parse_token(raw)?;
        let expires_on = claims
            .expires_on
            .ok_or_else(|| ClaimsError::malformed("missing exp claim"))?;

        Ok(Self { token: AccessToken::new(raw.trim(), expires_on), claims })
    }

    /// The SSO token as an access token.
    #[must_use]
    pub const fn as_access_token(&self) -> &AccessToken {
        &self.token
    }

    /// Raw token string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.token.token
    }

    /// Decoded claims.
    #[must_use]
    pub const fn claims(&self) -> &DecodedClaims {
        &self.claims
    }

    /// True once the current time is past the `exp` claim.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.token.is_expired()
    }

    /// User object ID (`oid`).
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.claims.object_id
    }

    /// Tenant ID (`tid`), empty when absent.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        self.claims.tenant_id.as_deref().unwrap_or_default()
    }

    /// Identity summary for display.
    #[must_use]
    pub fn user_info(&self) -> UserInfo {
        UserInfo::from(&self.claims)
    }
}

impl std::fmt::Debug for SsoToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoToken")
            .field("object_id", &self.claims.object_id)
            .field("expires_on", &self.token.expires_on_timestamp)
            .finish()
    }
}
