use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{RagError, RagResult};

/// Writes uploaded files under a single storage root.
///
/// Files keep their original name, so a second upload with the same name
/// replaces the first one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a file with this name would be stored at.
    pub fn path_for(&self, file_name: &str) -> RagResult<PathBuf> {
        // Only the last component is kept so "../x.pdf" cannot leave the root
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RagError::storage(&self.root, format!("invalid file name: {:?}", file_name)))?;

        Ok(self.root.join(name))
    }

    pub async fn save(&self, bytes: &[u8], file_name: &str) -> RagResult<PathBuf> {
        let path = self.path_for(file_name)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| RagError::storage(&self.root, e))?;

        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Overwriting existing upload at {}", path.display());
        }

        fs::write(&path, bytes)
            .await
            .map_err(|e| RagError::storage(&path, e))?;

        info!("Stored {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Deletes the root and everything in it. A missing root is not an error.
    pub async fn remove_all(&self) -> RagResult<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                info!("Removed storage at {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RagError::storage(&self.root, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_under_root_named_after_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("pdfs"));

        let path = store.save(b"%PDF-1.4 test", "report.pdf").await.unwrap();

        assert_eq!(path, dir.path().join("pdfs").join("report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn colliding_names_overwrite_silently() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save(b"first", "same.pdf").await.unwrap();
        let path = store.save(b"second", "same.pdf").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn directory_components_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let path = store.save(b"x", "../../etc/escape.pdf").await.unwrap();

        assert_eq!(path, dir.path().join("escape.pdf"));
    }

    #[tokio::test]
    async fn empty_name_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.save(b"x", "").await.unwrap_err();
        assert!(matches!(err, RagError::Storage { .. }));
    }

    #[tokio::test]
    async fn unwritable_root_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let store = FileStore::new(blocker.join("pdfs"));
        let err = store.save(b"x", "a.pdf").await.unwrap_err();

        assert!(matches!(err, RagError::Storage { .. }));
    }

    #[tokio::test]
    async fn remove_all_deletes_root_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session"));
        store.save(b"%PDF-1.4", "a.pdf").await.unwrap();

        store.remove_all().await.unwrap();
        assert!(!dir.path().join("session").exists());

        store.remove_all().await.unwrap();
    }
}
