//! Shared fixtures for integration tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use sso_credential::token::now_timestamp;

pub const USER_OID: &str = "fake-oid";
pub const TENANT_ID: &str = "fake-tid";

/// Encode `payload` as an unsigned compact token.
pub fn encode_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "none", "typ": "JWT"}).to_string());
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.fake-signature")
}

/// A v2 SSO token expiring at `exp`.
pub fn sso_token_expiring_at(exp: i64) -> String {
    encode_token(&json!({
        "ver": "2.0",
        "oid": USER_OID,
        "tid": TENANT_ID,
        "name": "fake-name",
        "preferred_username": "fake-user@contoso.com",
        "aud": "fake-client-id",
        "azpacr": "0",
        "exp": exp
    }))
}

/// A v2 SSO token valid for another hour.
pub fn valid_sso_token() -> String {
    sso_token_expiring_at(now_timestamp() + 3600)
}

/// A v2 SSO token that expired a minute ago.
pub fn expired_sso_token() -> String {
    sso_token_expiring_at(now_timestamp() - 60)
}
