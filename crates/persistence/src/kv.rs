//! Injected key-value storage.
//!
//! Demo data, settings and location trees are stored as JSON text under
//! string keys. The store is a capability handed to constructors.

use std::collections::BTreeMap;
use std::sync::RwLock;

use domain::error::GatewayError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// All keys starting with `prefix`, in key order.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// Reads and decodes a JSON value.
///
/// Returns `None` when the key is missing or holds something that does not
/// decode; the undecodable value is logged and left in place.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Ignoring undecodable stored value");
            None
        }
    }
}

/// Encodes and stores a JSON value.
pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), GatewayError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| GatewayError::InvalidInput(format!("cannot encode {}: {}", key, e)))?;
    store.set(key, raw);
    Ok(())
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }
}
