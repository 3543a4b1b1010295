use std::cell::RefCell;
use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use web_sys::{window, Storage};

use crate::error::StorageError;

/// Almacenamiento clave/valor de strings (localStorage en el navegador).
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// localStorage del navegador
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> Result<Storage, StorageError> {
        window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StorageError::Unavailable("window.localStorage".to_string()))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::local_storage().ok()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::local_storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}

/// Almacenamiento en memoria (tests y hosts sin navegador)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

pub fn save_to_storage<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(StorageError::Serialization)?;
    storage.set_item(key, &json)
}

/// `Ok(None)` si no hay registro, `Err(Corrupted)` si no se puede parsear.
pub fn load_from_storage<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get_item(key) {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(StorageError::Corrupted),
        None => Ok(None),
    }
}

pub fn remove_from_storage(storage: &dyn KeyValueStorage, key: &str) -> Result<(), StorageError> {
    storage.remove_item(key)
}
