//! In-memory access token cache.
//!
//! Entries are never evicted; a token within [`api::NEAR_EXPIRY_MARGIN`] of
//! its expiry is treated as absent on lookup and replaced by the next
//! successful exchange.

mod key;

pub use key::{derive_assertion_bound_cache_key, derive_cache_key};

use moka::future::Cache;

use crate::config::api;
use crate::token::{AccessToken, now_timestamp};

/// Process-local access token cache.
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct TokenCache {
    entries: Cache<String, AccessToken>,
}

impl TokenCache {
    /// Create an empty, unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Cache::builder().name("access-tokens").build() }
    }

    /// Look up a token regardless of its expiry.
    pub async fn get(&self, key: &str) -> Option<AccessToken> {
        self.entries.get(key).await
    }

    /// Look up a token that is not near expiry.
    pub async fn get_fresh(&self, key: &str) -> Option<AccessToken> {
        self.get(key)
            .await
            .filter(|token| !Self::is_near_expired(token.expires_on_timestamp))
    }

    /// Store a token, replacing any previous entry for `key`.
    pub async fn set(&self, key: String, token: AccessToken) {
        self.entries.insert(key, token).await;
    }

    /// Drop the entry for `key`.
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// True when the remaining lifetime is at or below the refresh margin.
    #[must_use]
    pub fn is_near_expired(expires_on_timestamp: i64) -> bool {
        Self::is_near_expired_at(expires_on_timestamp, now_timestamp())
    }

    /// [`Self::is_near_expired`] against a supplied clock.
    #[must_use]
    pub fn is_near_expired_at(expires_on_timestamp: i64, now: i64) -> bool {
        let margin = i64::try_from(api::NEAR_EXPIRY_MARGIN.as_secs()).unwrap_or(i64::MAX);
        expires_on_timestamp.saturating_sub(now) <= margin
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_expiry_margin() {
        let now = 1_000_000;
        assert!(TokenCache::is_near_expired_at(now + 4 * 60, now));
        assert!(TokenCache::is_near_expired_at(now + 5 * 60, now));
        assert!(!TokenCache::is_near_expired_at(now + 5 * 60 + 1, now));
        assert!(TokenCache::is_near_expired_at(now - 10, now));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = TokenCache::new();
        let exp = now_timestamp() + 3600;
        cache.set("k".into(), AccessToken::new("first", exp)).await;
        cache.set("k".into(), AccessToken::new("second", exp)).await;
        assert_eq!(cache.get("k").await.unwrap().token, "second");
    }

    #[tokio::test]
    async fn test_get_fresh_skips_near_expired() {
        let cache = TokenCache::new();
        cache.set("k".into(), AccessToken::new("stale", now_timestamp() + 4 * 60)).await;
        assert!(cache.get("k").await.is_some());
        assert!(cache.get_fresh("k").await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = TokenCache::new();
        let clone = cache.clone();
        clone.set("k".into(), AccessToken::new("t", now_timestamp() + 3600)).await;
        assert!(cache.get_fresh("k").await.is_some());

        cache.invalidate("k").await;
        assert!(clone.get("k").await.is_none());
    }
}
