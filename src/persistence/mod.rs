//! Key/value persistence for high scores, achievements and settings
//!
//! Modelled on browser LocalStorage: string keys, JSON string values.
//! Backends:
//! - `MemoryStorage`: in-process map (tests, headless runs)
//! - `FileStorage`: one JSON file per key in a data directory (native)
//! - `LocalStorage`: browser LocalStorage (wasm32)
//!
//! Every failure here is non-fatal to the game. `load_json` / `save_json`
//! log and fall back so callers never have to handle storage errors.

mod file;
#[cfg(target_arch = "wasm32")]
mod local;
mod memory;

pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Prefix shared by every key this game writes
pub const STORAGE_NAMESPACE: &str = "bottle_catch_";

/// A string key/value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// Build a namespaced storage key
pub fn storage_key(name: &str) -> String {
    format!("{STORAGE_NAMESPACE}{name}")
}

/// Read and decode a JSON value
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match storage.get_item(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn write_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

/// Load a value, falling back to `T::default()` on a missing or unreadable entry
pub fn load_json<T: DeserializeOwned + Default>(storage: &dyn Storage, key: &str) -> T {
    match read_json(storage, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Failed to load '{}', using defaults: {}", key, e);
            T::default()
        }
    }
}

/// Save a value; failures are logged and otherwise ignored
pub fn save_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> bool {
    match write_json(storage, key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to save '{}': {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_namespaced() {
        assert_eq!(storage_key("highscores"), "bottle_catch_highscores");
    }

    #[test]
    fn test_load_json_falls_back_on_corruption() {
        let storage = MemoryStorage::new();
        storage.set_item("bad", "{not json").unwrap();
        let value: Vec<u32> = load_json(&storage, "bad");
        assert!(value.is_empty());

        assert!(matches!(
            read_json::<Vec<u32>>(&storage, "bad"),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        assert!(save_json(&storage, "ids", &vec![1u32, 4, 5]));
        let ids: Vec<u32> = load_json(&storage, "ids");
        assert_eq!(ids, vec![1, 4, 5]);
    }

    #[test]
    fn test_save_failure_is_reported_not_raised() {
        let storage = MemoryStorage::unavailable();
        assert!(!save_json(&storage, "ids", &vec![1u32]));
        let ids: Vec<u32> = load_json(&storage, "ids");
        assert!(ids.is_empty());
    }
}
