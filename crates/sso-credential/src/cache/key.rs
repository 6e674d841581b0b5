//! Access token cache key derivation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::config::api;
use crate::scopes::Scopes;

/// Derive the cache key for a (user, client, tenant, scopes) tuple.
///
/// The key is a JSON array, so component boundaries survive any characters
/// inside the components. Scopes use their canonical (sorted) form.
#[must_use]
pub fn derive_cache_key(user_id: &str, client_id: &str, tenant_id: &str, scopes: &Scopes) -> String {
    serde_json::json!([
        api::ACCESS_TOKEN_CACHE_KEY_PREFIX,
        user_id,
        tenant_id,
        client_id,
        scopes.canonical(),
    ])
    .to_string()
}

/// Derive a cache key that also binds the exact assertion presented.
///
/// Used where claims come from unverified bearer tokens shared across
/// callers: two tokens with the same `oid`/`tid` but different bytes never
/// share an entry. Appends `BASE64URL(SHA256(assertion))` to the
/// [`derive_cache_key`] components.
#[must_use]
pub fn derive_assertion_bound_cache_key(
    user_id: &str,
    client_id: &str,
    tenant_id: &str,
    scopes: &Scopes,
    assertion: &str,
) -> String {
    let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(assertion.as_bytes()));
    serde_json::json!([
        api::ACCESS_TOKEN_CACHE_KEY_PREFIX,
        user_id,
        tenant_id,
        client_id,
        scopes.canonical(),
        digest,
    ])
    .to_string()
}
