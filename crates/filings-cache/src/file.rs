//! On-disk cache implementation.

use async_trait::async_trait;
use filings_core::{FilingCache, FilingsError, Result, sanitize_key};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// On-disk cache storing each entry as `<dir>/<key>.txt` (UTF-8).
///
/// Keys are sanitized to `[A-Za-z0-9._-]` before being used as file names.
/// Entries persist across runs and are never refreshed or evicted.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a file cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            FilingsError::Cache(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the cached files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", sanitize_key(key)))
    }
}

#[async_trait]
impl FilingCache for FileCache {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!("Cache hit: {}", path.display());
                Ok(Some(text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss: {}", path.display());
                Ok(None)
            }
            Err(e) => Err(FilingsError::Cache(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    #[instrument(skip(self, text), fields(dir = %self.dir.display(), len = text.len()))]
    async fn put_text(&self, key: &str, text: &str) -> Result<()> {
        let path = self.path_for(key);
        tokio::fs::write(&path, text).await.map_err(|e| {
            FilingsError::Cache(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!("Cached {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_cache_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path().join("sec_cache")).unwrap();
        assert!(cache.dir().is_dir());

        // Initially no data
        let key = "0001045810-24-000029-index.htm";
        assert!(cache.get_text(key).await.unwrap().is_none());
        assert!(!cache.contains(key).await.unwrap());

        cache.put_text(key, "NVIDIA Corporation\nAnnual Report").await.unwrap();

        let text = cache.get_text(key).await.unwrap();
        assert_eq!(text.as_deref(), Some("NVIDIA Corporation\nAnnual Report"));
        assert!(cache.path_for(key).ends_with("0001045810-24-000029-index.htm.txt"));
    }

    #[tokio::test]
    async fn test_file_cache_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        FileCache::new(tmp.path())
            .unwrap()
            .put_text("NVDA_10-K", "cached")
            .await
            .unwrap();

        let reopened = FileCache::new(tmp.path()).unwrap();
        assert_eq!(
            reopened.get_text("NVDA_10-K").await.unwrap().as_deref(),
            Some("cached")
        );
    }

    #[tokio::test]
    async fn test_file_cache_sanitizes_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();
        cache.put_text("../escape", "x").await.unwrap();

        let path = cache.path_for("../escape");
        assert_eq!(path.parent(), Some(tmp.path()));
        assert!(path.exists());
    }
}
