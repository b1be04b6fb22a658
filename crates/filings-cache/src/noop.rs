//! No-op cache implementation.

use async_trait::async_trait;
use filings_core::{FilingCache, Result};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_text` always returns `Ok(None)` and `put_text` returns `Ok(())`.
/// Useful for disabling caching or forcing the network path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FilingCache for NoopCache {
    async fn get_text(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopCache: get_text called, returning None");
        Ok(None)
    }

    async fn put_text(&self, _key: &str, _text: &str) -> Result<()> {
        trace!("NoopCache: put_text called, doing nothing");
        Ok(())
    }
}
