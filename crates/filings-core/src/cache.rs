//! Cache trait for storing fetched filing text.
//!
//! This module defines the [`FilingCache`] trait. Entries are keyed by a string
//! derived from the source URL and are never refreshed: once a key is present,
//! readers get the stored text back unchanged.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for caching cleaned filing text.
///
/// Implementations can store text in various backends (files on disk, in-memory)
/// to avoid repeated downloads. There is no eviction, TTL or invalidation.
#[async_trait]
pub trait FilingCache: Send + Sync + std::fmt::Debug {
    /// Retrieves cached text.
    ///
    /// Returns `Ok(Some(text))` if cached, `Ok(None)` if not cached.
    async fn get_text(&self, key: &str) -> Result<Option<String>>;

    /// Stores text under a key, overwriting any previous entry.
    async fn put_text(&self, key: &str, text: &str) -> Result<()>;

    /// Returns true if the key is cached.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_text(key).await?.is_some())
    }
}

/// Derives a cache key from a source URL.
///
/// The key is the last `/`-separated segment with every character outside
/// `[A-Za-z0-9._-]` replaced by `_`. An empty segment maps to `"index"`.
#[must_use]
pub fn cache_key_for_url(url: &str) -> String {
    let fragment = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let key = sanitize_key(fragment);
    if key.is_empty() { "index".to_string() } else { key }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
