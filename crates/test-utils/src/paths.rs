//! Temporary store locations for tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// A temporary directory holding one or more dataset stores.
///
/// The directory and everything in it is removed on drop.
pub struct TempStore {
    dir: TempDir,
}

impl TempStore {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Path of a store named `name` inside the temporary directory.
    ///
    /// The store directory itself is not created.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_store_cleanup() {
        let root = {
            let store = TempStore::new();
            let path = store.path("cube.zarr");
            assert!(path.starts_with(store.root()));
            assert!(!path.exists());
            store.root()
        };
        assert!(!root.exists());
    }
}
