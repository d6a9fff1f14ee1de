//! Key/value JSON storage
//!
//! On wasm32 values live in `window.localStorage`. Native builds keep them in
//! a per-thread map so the rest of the game behaves the same in headless runs
//! and tests, but nothing survives the process.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum StorageError {
    /// No storage backend (private browsing, no window)
    Unavailable,
    Serialize(serde_json::Error),
    /// The backend rejected the write (quota exceeded and the like)
    Write(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Storage is unavailable"),
            StorageError::Serialize(e) => write!(f, "Could not serialize value: {}", e),
            StorageError::Write(msg) => write!(f, "Storage write failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialize(e)
    }
}

/// Load and deserialize the value under `key`.
///
/// Missing keys return `None`. Corrupt values are logged and also return
/// `None` so callers fall back to defaults.
pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = read_raw(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt '{}' entry: {}", key, e);
            None
        }
    }
}

/// Serialize `value` and store it under `key`
pub fn save<T: Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    write_raw(key, &json)
}

pub fn remove(key: &str) {
    remove_raw(key);
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
}

#[cfg(target_arch = "wasm32")]
fn read_raw(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn write_raw(key: &str, json: &str) -> Result<(), StorageError> {
    let storage = local_storage().ok_or(StorageError::Unavailable)?;
    storage
        .set_item(key, json)
        .map_err(|e| StorageError::Write(format!("{:?}", e)))
}

#[cfg(target_arch = "wasm32")]
fn remove_raw(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static MEMORY: std::cell::RefCell<std::collections::HashMap<String, String>> =
        std::cell::RefCell::new(std::collections::HashMap::new());
}

#[cfg(not(target_arch = "wasm32"))]
fn read_raw(key: &str) -> Option<String> {
    MEMORY.with(|m| m.borrow().get(key).cloned())
}

#[cfg(not(target_arch = "wasm32"))]
fn write_raw(key: &str, json: &str) -> Result<(), StorageError> {
    MEMORY.with(|m| {
        m.borrow_mut().insert(key.to_string(), json.to_string());
    });
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn remove_raw(key: &str) {
    MEMORY.with(|m| {
        m.borrow_mut().remove(key);
    });
}
