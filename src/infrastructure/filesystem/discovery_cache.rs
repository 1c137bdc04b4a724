use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::common::result::{ResultExt, WcResult};

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    written_at: DateTime<Utc>,
    children: Vec<PathBuf>,
}

/// On-disk list of a root working copy's direct children.
///
/// Lives inside the root's metadata directory and expires by file mtime.
#[derive(Debug, Clone)]
pub struct DiscoveryCache {
    path: PathBuf,
    max_age: Duration,
}

impl DiscoveryCache {
    pub const FILE_NAME: &'static str = "wctree-children.json";

    pub fn for_root(root: &Path, marker: &str, max_age: Duration) -> Self {
        Self {
            path: root.join(marker).join(Self::FILE_NAME),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached child paths, or `None` when absent, stale or unreadable
    pub fn load(&self) -> Option<Vec<PathBuf>> {
        let metadata = fs::metadata(&self.path).ok()?;
        let modified = metadata.modified().ok()?;
        if !self.is_fresh(modified) {
            tracing::debug!(path = %self.path.display(), "discovery cache expired");
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "cannot read discovery cache: {}", err);
                return None;
            }
        };

        match serde_json::from_str::<CacheFile>(&contents) {
            Ok(cache) => {
                tracing::debug!(
                    path = %self.path.display(),
                    written_at = %cache.written_at,
                    "using discovery cache"
                );
                Some(cache.children)
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "ignoring corrupt discovery cache: {}", err);
                None
            }
        }
    }

    pub fn store(&self, children: &[PathBuf]) -> WcResult<()> {
        let cache = CacheFile {
            written_at: Utc::now(),
            children: children.to_vec(),
        };
        let json = serde_json::to_string_pretty(&cache)?;

        // Write then rename so a reader never sees a partial file
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_filesystem_error("Discovery cache write failed", Some(temp_path.clone()))?;
        fs::rename(&temp_path, &self.path)
            .with_filesystem_error("Discovery cache write failed", Some(self.path.clone()))
    }

    pub fn invalidate(&self) -> WcResult<()> {
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "invalidating discovery cache");
            fs::remove_file(&self.path)
                .with_filesystem_error("Discovery cache removal failed", Some(self.path.clone()))?;
        }
        Ok(())
    }

    fn is_fresh(&self, modified: SystemTime) -> bool {
        // A modification time in the future counts as brand new
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age < self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cache_in(temp_dir: &TempDir, max_age: Duration) -> DiscoveryCache {
        fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        DiscoveryCache::for_root(temp_dir.path(), ".git", max_age)
    }

    #[test]
    fn test_store_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir, Duration::from_secs(3600));
        let children = vec![temp_dir.path().join("a"), temp_dir.path().join("b")];

        assert_eq!(cache.load(), None);
        cache.store(&children).unwrap();
        assert_eq!(
            cache.path(),
            temp_dir.path().join(".git").join("wctree-children.json")
        );
        assert_eq!(cache.load(), Some(children));
    }

    #[test]
    fn test_expired_cache_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir, Duration::ZERO);
        cache.store(&[temp_dir.path().join("a")]).unwrap();

        assert!(cache.path().exists());
        assert_eq!(cache.load(), None);
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir, Duration::from_secs(3600));
        fs::write(cache.path(), "not json").unwrap();

        assert_eq!(cache.load(), None);
    }

    #[test]
    fn test_invalidate_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir, Duration::from_secs(3600));
        cache.store(&[]).unwrap();
        assert_eq!(cache.load(), Some(vec![]));

        cache.invalidate().unwrap();
        assert!(!cache.path().exists());
        // Invalidating twice is fine
        cache.invalidate().unwrap();
    }
}
