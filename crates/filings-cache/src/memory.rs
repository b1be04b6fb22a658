//! In-memory cache implementation.

use async_trait::async_trait;
use filings_core::{FilingCache, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory cache for testing and development.
///
/// Text is stored in a `RwLock`-protected `HashMap` and is lost when the cache
/// is dropped. Values are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FilingCache for InMemoryCache {
    #[instrument(skip(self))]
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        let cache = self.entries.read().await;
        match cache.get(key) {
            Some(text) => {
                debug!("Cache hit for filing text");
                Ok(Some(text.clone()))
            }
            None => {
                debug!("Cache miss for filing text");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn put_text(&self, key: &str, text: &str) -> Result<()> {
        let mut cache = self.entries.write().await;
        cache.insert(key.to_string(), text.to_string());
        debug!("Cached filing text");
        Ok(())
    }
}
