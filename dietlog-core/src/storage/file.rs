//! File-backed key-value storage.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::{validate_key, KeyValueStore, StorageError};

/// Stores each key as a file named after the key in the data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.data_dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }

    /// Creates the data directory if it doesn't exist.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;

        fs::create_dir_all(&self.data_dir).map_err(|e| StorageError::Io {
            path: self.data_dir.clone(),
            source: e,
        })?;

        // Write a sibling temp file, then rename it over the key.
        let tmp_path = self.data_dir.join(format!(".{}.tmp", key));
        fs::write(&tmp_path, value).map_err(|e| StorageError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| StorageError::Io { path, source: e })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io { path, source: e }),
        }
    }
}
