//! Native file-backed storage

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Storage;
use crate::error::StoreError;

/// Native storage backend: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the data directory (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal constants, but keep them from escaping the directory
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write to a temp file first so a crash never leaves a half-written value
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let storage = FileStorage::new(dir.path().join("data"));

        assert_eq!(storage.get_item("bottle_catch_settings").unwrap(), None);
        storage.set_item("bottle_catch_settings", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.get_item("bottle_catch_settings").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        storage.remove_item("bottle_catch_settings").unwrap();
        assert_eq!(storage.get_item("bottle_catch_settings").unwrap(), None);
        // Removing twice is fine
        storage.remove_item("bottle_catch_settings").unwrap();
    }

    #[test]
    fn test_key_sanitized() {
        let storage = FileStorage::new("/data");
        assert_eq!(storage.path_for("../etc"), PathBuf::from("/data/___etc.json"));
    }
}
