//! File-backed key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes land in a sibling temporary
//! file first and are renamed into place, so readers see either the old blob
//! or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::{KeyValueStore, PersistenceError};

/// A [`KeyValueStore`] that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `key` can be used as a file name: ASCII letters, digits, `-`,
    /// `_` and `.`, not starting with a dot.
    #[must_use]
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.')
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if !Self::is_valid_key(key) {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("Cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("Cart", r#"[{"id":1}]"#.to_string()).await.unwrap();
        store.set("Cart", "[]".to_string()).await.unwrap();

        assert_eq!(store.get("Cart").await.unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/Cart.json").exists());
        assert!(!dir.path().join("nested/Cart.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../Cart", "a/b", ".hidden"] {
            let err = store.set(key, "x".to_string()).await.unwrap_err();
            assert!(matches!(err, PersistenceError::InvalidKey(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        std::fs::create_dir(dir.path().join("Cart.json")).unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get("Cart").await.is_err());
        assert!(store.set("Cart", "[]".to_string()).await.is_err());
    }
}
