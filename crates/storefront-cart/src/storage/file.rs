//! File-backed store: one JSON file per key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use storefront_core::validation::validate_storage_key;

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Stores each key as `<dir>/<key>.json`.
///
/// ## Write Path
/// ```text
/// set("tiendanube-cart", json)
///      │
///      ├── create_dir_all(dir)
///      ├── write  <dir>/.tiendanube-cart.json.tmp
///      └── rename → <dir>/tiendanube-cart.json
/// ```
/// A crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Creates a store in the platform data directory.
    ///
    /// - **macOS**: `~/Library/Application Support/com.storefront.cart/`
    /// - **Windows**: `%APPDATA%\storefront\cart\data\`
    /// - **Linux**: `~/.local/share/cart/`
    pub fn in_platform_data_dir() -> StorageResult<Self> {
        Self::platform_data_dir()
            .map(FileStore::new)
            .ok_or_else(|| {
                StorageError::Unavailable("could not determine app data directory".to_string())
            })
    }

    /// The platform data directory, if the OS exposes one.
    pub fn platform_data_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "storefront", "cart").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_storage_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(?path, "No stored value");
                Ok(None)
            }
            Err(err) => Err(StorageError::io(key, err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        fs::create_dir_all(&self.dir).map_err(|err| StorageError::io(key, err))?;
        fs::write(&tmp, value).map_err(|err| StorageError::io(key, err))?;
        fs::rename(&tmp, &path).map_err(|err| StorageError::io(key, err))?;

        debug!(?path, bytes = value.len(), "Stored value");
        Ok(())
    }
}
