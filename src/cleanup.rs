//! Scoped cleanup of temporary download artifacts.

use log::debug;
use std::path::{Path, PathBuf};

/// RAII guard for the temporary archive an install stages on disk.
///
/// The artifact's lifetime is the install operation: the guard removes the
/// file when dropped, on success and on every failure path alike. Removal
/// of a file that was never created is not an error.
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        debug!("Cleaning up: {:?}", self.path);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_removed_on_drop() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("package.zip");
        fs::write(&file_path, "bytes").unwrap();

        {
            let _guard = TempArtifact::new(file_path.clone());
            assert!(file_path.exists());
        }

        assert!(!file_path.exists());
    }

    #[test]
    fn test_missing_artifact_is_not_an_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("never-created.zip");

        let guard = TempArtifact::new(file_path.clone());
        assert_eq!(guard.path(), file_path.as_path());
        drop(guard);
    }
}
