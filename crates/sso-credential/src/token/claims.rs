//! Compact token claim decoding.
//!
//! Claims are read for display and cache keying only. Signatures are never
//! verified here; trust is established by whoever issued the token to us.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Errors from decoding a compact token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    /// Wrong segment count, bad base64 or bad JSON.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The `ver` claim is neither `1.0` nor `2.0`.
    #[error("unsupported token version: {0}")]
    UnsupportedVersion(String),
}

impl ClaimsError {
    /// Create a malformed token error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Token format version, from the `ver` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenVersion {
    /// Azure AD v1.0 token.
    #[serde(rename = "1.0")]
    V1,
    /// Microsoft identity platform v2.0 token.
    #[serde(rename = "2.0")]
    V2,
}

impl TokenVersion {
    /// Claim value for this version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        }
    }
}

/// Kind of identity the token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UserType {
    /// Delegated user identity (authentication context class `"0"`).
    User,
    /// Application identity.
    ServicePrincipal,
}

/// Normalized claims of a decoded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedClaims {
    /// `oid` claim.
    pub object_id: String,
    /// `name` claim.
    pub display_name: String,
    /// `upn` for v1 tokens, `preferred_username` for v2 tokens.
    pub preferred_user_name: String,
    /// Token format version.
    pub token_version: TokenVersion,
    /// `tid` claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// `aud` claim (first entry when it is an array).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Derived from `appidacr` (v1) or `azpacr` (v2).
    pub user_type: UserType,
    /// `exp` claim, epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    ver: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    upn: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    appidacr: Option<String>,
    #[serde(default)]
    azpacr: Option<String>,
    #[serde(default)]
    tid: Option<String>,
    #[serde(default)]
    aud: Option<JsonValue>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode the claims of a compact `header.payload.signature` token.
///
/// # Errors
///
/// Returns [`ClaimsError::Malformed`] on structural problems and
/// [`ClaimsError::UnsupportedVersion`] when `ver` is not `1.0` or `2.0`.
pub fn parse_token(raw: &str) -> Result<DecodedClaims, ClaimsError> {
    let segments: Vec<&str> = raw.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimsError::malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| ClaimsError::malformed(format!("invalid base64 payload: {e}")))?;

    let claims: RawClaims = serde_json::from_slice(&payload)
        .map_err(|e| ClaimsError::malformed(format!("invalid JSON payload: {e}")))?;

    let (token_version, user_name, acr) = match claims.ver.as_deref() {
        Some("1.0") => (TokenVersion::V1, claims.upn, claims.appidacr),
        Some("2.0") => (TokenVersion::V2, claims.preferred_username, claims.azpacr),
        Some(other) => return Err(ClaimsError::UnsupportedVersion(other.to_string())),
        None => return Err(ClaimsError::UnsupportedVersion("<missing>".to_string())),
    };

    let user_type = if acr.as_deref() == Some("0") {
        UserType::User
    } else {
        UserType::ServicePrincipal
    };

    let audience = match claims.aud {
        Some(JsonValue::String(aud)) => Some(aud),
        Some(JsonValue::Array(values)) => {
            values.into_iter().find_map(|v| v.as_str().map(str::to_string))
        }
        _ => None,
    };

    Ok(DecodedClaims {
        object_id: claims.oid.unwrap_or_default(),
        display_name: claims.name.unwrap_or_default(),
        preferred_user_name: user_name.unwrap_or_default(),
        token_version,
        tenant_id: claims.tid,
        audience,
        user_type,
        expires_on: claims.exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(payload: &serde_json::Value) -> String {
        format!("eyJhbGciOiJub25lIn0.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    #[test]
    fn test_v1_reads_upn() {
        let token = encode(&serde_json::json!({
            "ver": "1.0", "oid": "fake-oid", "name": "fake-name", "upn": "fake-upn",
            "appidacr": "0", "tid": "fake-tid"
        }));
        let claims = parse_token(&token).unwrap();
        assert_eq!(claims.preferred_user_name, "fake-upn");
        assert_eq!(claims.token_version, TokenVersion::V1);
        assert_eq!(claims.user_type, UserType::User);
        assert_eq!(claims.tenant_id.as_deref(), Some("fake-tid"));
    }

    #[test]
    fn test_v2_reads_preferred_username() {
        let token = encode(&serde_json::json!({
            "ver": "2.0", "oid": "fake-oid", "name": "fake-name",
            "preferred_username": "fake-preferred_username", "azpacr": "1"
        }));
        let claims = parse_token(&token).unwrap();
        assert_eq!(claims.preferred_user_name, "fake-preferred_username");
        assert_eq!(claims.user_type, UserType::ServicePrincipal);
    }

    #[test]
    fn test_audience_array_takes_first() {
        let token = encode(&serde_json::json!({"ver": "2.0", "aud": ["api://a", "api://b"]}));
        assert_eq!(parse_token(&token).unwrap().audience.as_deref(), Some("api://a"));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let body = URL_SAFE_NO_PAD.encode(serde_json::json!({"ver": "2.0"}).to_string());
        let token = format!("h.{body}==.s");
        assert!(parse_token(&token).is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let token = encode(&serde_json::json!({"ver": "3.0"}));
        assert_eq!(
            parse_token(&token).unwrap_err(),
            ClaimsError::UnsupportedVersion("3.0".to_string())
        );
        let token = encode(&serde_json::json!({"oid": "x"}));
        assert!(matches!(parse_token(&token), Err(ClaimsError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(parse_token("only.two"), Err(ClaimsError::Malformed(_))));
        assert!(matches!(parse_token("a.!!!.c"), Err(ClaimsError::Malformed(_))));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("not json"));
        assert!(matches!(parse_token(&not_json), Err(ClaimsError::Malformed(_))));
    }
}
