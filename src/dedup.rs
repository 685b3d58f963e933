//! Persisted set of already-processed article identifiers.
//!
//! The file holds a JSON array of URL strings. It is read once when a run
//! starts and written once after collection. A missing file means nothing
//! has been processed yet.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct DedupStore {
    path: PathBuf,
}

impl DedupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the identifier set, or an empty set when the file is absent.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<HashSet<String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No dedup state yet; starting empty");
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };
        let urls: Vec<String> = serde_json::from_str(&content)?;
        let seen: HashSet<String> = urls.into_iter().collect();
        info!(count = seen.len(), "Loaded previously processed URLs");
        Ok(seen)
    }

    /// Overwrite the file with `seen`.
    ///
    /// Entries are sorted so successive files diff cleanly; readers must not
    /// rely on any order.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self, seen: &HashSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut urls: Vec<&String> = seen.iter().collect();
        urls.sort();
        let json = serde_json::to_string(&urls)?;
        fs::write(&self.path, json).await?;
        debug!(count = urls.len(), "Wrote dedup state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::new(dir.path().join("nested/state/seen.json"));

        let seen: HashSet<String> = ["https://x/2", "https://x/1"]
            .into_iter()
            .map(String::from)
            .collect();
        store.save(&seen).await.unwrap();

        assert_eq!(store.load().await.unwrap(), seen);
    }

    #[tokio::test]
    async fn test_save_writes_json_array_of_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let store = DedupStore::new(&path);

        let seen: HashSet<String> = ["b", "a"].into_iter().map(String::from).collect();
        store.save(&seen).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_last_save_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::new(dir.path().join("seen.json"));

        let first: HashSet<String> = ["https://x/1".to_string()].into();
        let second: HashSet<String> = ["https://x/2".to_string()].into();
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_reads_file_written_by_other_tools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, r#"["https://x/1", "https://x/1", "https://x/9"]"#).unwrap();

        let seen = DedupStore::new(&path).load().await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("https://x/9"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = DedupStore::new(&path).load().await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
