//! Identity provider seam for the on-behalf-of exchange.

use crate::error::AuthError;
use crate::scopes::Scopes;

/// Failure category reported by an identity provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The user must sign in or consent interactively.
    InteractionRequired,
    /// The assertion (SSO token) is outside its validity window.
    AssertionExpired,
    /// Anything else.
    Other,
}

/// Error returned by an [`IdentityProvider`], classified at the adapter boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// Failure category.
    pub kind: ProviderErrorKind,
    /// Provider message, passed through for diagnostics.
    pub message: String,
}

impl ProviderError {
    /// Create a provider error.
    #[must_use]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Create an uncategorized provider error.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err.kind {
            ProviderErrorKind::InteractionRequired => Self::ui_required(format!(
                "Failed to get access token from AAD server, interaction required: {}",
                err.message
            )),
            ProviderErrorKind::AssertionExpired => {
                Self::token_expired(format!("Failed to get access token: {}", err.message))
            }
            ProviderErrorKind::Other => Self::service(format!(
                "Failed to acquire access token on behalf of user: {}",
                err.message
            )),
        }
    }
}

/// Token issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderToken {
    /// Access token string.
    pub access_token: String,
    /// Expiry, epoch seconds.
    pub expires_on: i64,
}

/// Performs the delegated (on-behalf-of) token request.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange `assertion` for a token carrying `scopes`.
    ///
    /// `Ok(None)` means the provider answered without a token.
    async fn acquire_token_on_behalf_of(
        &self,
        assertion: &str,
        scopes: &Scopes,
    ) -> Result<Option<ProviderToken>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_kind_maps_to_error_code() {
        let cases = [
            (ProviderErrorKind::InteractionRequired, ErrorCode::UiRequiredError),
            (ProviderErrorKind::AssertionExpired, ErrorCode::TokenExpiredError),
            (ProviderErrorKind::Other, ErrorCode::ServiceError),
        ];
        for (kind, code) in cases {
            let err: AuthError = ProviderError::new(kind, "detail").into();
            assert_eq!(err.code(), code);
            assert!(err.to_string().contains("detail"));
        }
    }
}
