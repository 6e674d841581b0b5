use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bearer token plus its expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The token string.
    #[serde(alias = "access_token")]
    pub token: String,

    /// Expiry, epoch seconds.
    #[serde(rename = "expiresOnTimestamp", alias = "expires_on")]
    pub expires_on_timestamp: i64,
}

impl AccessToken {
    /// Create a new access token.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_on_timestamp: i64) -> Self {
        Self { token: token.into(), expires_on_timestamp }
    }

    /// True once `now` is strictly past the expiry.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_on_timestamp
    }

    /// True once the current time is past the expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(super::now_timestamp())
    }

    /// Expiry as a UTC datetime.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_on_timestamp, 0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_len", &self.token.len())
            .field("expires_on_timestamp", &self.expires_on_timestamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let token = AccessToken::new("t", 1_000);
        assert!(!token.is_expired_at(1_000));
        assert!(token.is_expired_at(1_001));
    }

    #[test]
    fn test_wire_format() {
        let token = AccessToken::new("A1", 42);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({"token": "A1", "expiresOnTimestamp": 42}));

        let legacy: AccessToken =
            serde_json::from_value(serde_json::json!({"access_token": "A2", "expires_on": 7}))
                .unwrap();
        assert_eq!(legacy, AccessToken::new("A2", 7));
    }

    #[test]
    fn test_debug_hides_token() {
        let token = AccessToken::new("secret-token-value", 0);
        assert!(!format!("{token:?}").contains("secret-token-value"));
    }
}
