//! Error types for the SSO credential core.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Every failure carries a stable [`ErrorCode`] so callers can branch without string matching.

use std::fmt;

use crate::token::ClaimsError;

/// Stable error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Required auth configuration is missing or invalid.
    InvalidConfiguration,
    /// Malformed caller input.
    InvalidParameter,
    /// SSO token or exchanged token has expired.
    TokenExpiredError,
    /// The identity provider demands interactive sign-in or consent.
    UiRequiredError,
    /// Contract violation from the provider or an unparseable token.
    InternalError,
    /// Provider or remote service failure with no known category.
    ServiceError,
}

impl ErrorCode {
    /// The wire name of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "InvalidConfiguration",
            Self::InvalidParameter => "InvalidParameter",
            Self::TokenExpiredError => "TokenExpiredError",
            Self::UiRequiredError => "UiRequiredError",
            Self::InternalError => "InternalError",
            Self::ServiceError => "ServiceError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from credential operations.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// Required configuration missing or invalid.
    #[error("{0}")]
    InvalidConfiguration(String),

    /// Malformed caller input.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// SSO token or access token expired.
    #[error("Token expired: {0}")]
    TokenExpired(String),

    /// Interactive sign-in or consent required.
    #[error("UI interaction required: {0}")]
    UiRequired(String),

    /// Provider contract violation.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Provider or remote service rejected the request.
    #[error("Service error: {0}")]
    Service(String),

    /// Token could not be decoded.
    #[error("Failed to parse token: {0}")]
    InvalidToken(#[from] ClaimsError),

    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    /// Create an invalid configuration error listing every missing field.
    ///
    /// The message reads `client_id, tenant_id in configuration is invalid: undefined.`
    #[must_use]
    pub fn missing_configuration(fields: &[&str]) -> Self {
        Self::InvalidConfiguration(format!(
            "{} in configuration is invalid: undefined.",
            fields.join(", ")
        ))
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create a token expired error.
    #[must_use]
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::TokenExpired(message.into())
    }

    /// Create a UI required error.
    #[must_use]
    pub fn ui_required(message: impl Into<String>) -> Self {
        Self::UiRequired(message.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a service error.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    /// Stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            Self::InvalidParameter(_) => ErrorCode::InvalidParameter,
            Self::TokenExpired(_) => ErrorCode::TokenExpiredError,
            Self::UiRequired(_) => ErrorCode::UiRequiredError,
            Self::Internal(_) | Self::InvalidToken(_) => ErrorCode::InternalError,
            Self::Service(_) | Self::Http(_) => ErrorCode::ServiceError,
        }
    }

    /// Returns true if the caller must sign in interactively before retrying.
    #[must_use]
    pub const fn requires_interaction(&self) -> bool {
        matches!(self, Self::UiRequired(_))
    }

    /// Returns true if a fresh SSO token is needed before retrying.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::TokenExpired(_))
    }
}

/// Result type alias for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_lists_fields() {
        let err = AuthError::missing_configuration(&["client_id", "tenant_id"]);
        assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
        assert_eq!(err.to_string(), "client_id, tenant_id in configuration is invalid: undefined.");
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AuthError::ui_required("login").code().as_str(), "UiRequiredError");
        assert_eq!(AuthError::token_expired("sso").code().as_str(), "TokenExpiredError");
        assert_eq!(AuthError::service("boom").code().as_str(), "ServiceError");
        assert_eq!(
            AuthError::from(ClaimsError::malformed("bad")).code(),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::ui_required("login").requires_interaction());
        assert!(!AuthError::internal("null").requires_interaction());
        assert!(AuthError::token_expired("sso").is_expired());
    }
}
