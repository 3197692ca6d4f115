//! Named attribute storage shared by request, session and application scopes.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

/// Thread-safe string-keyed attribute map.
///
/// Scopes are shared behind `Arc`, so all mutation goes through `&self`.
/// Setting `Value::Null` removes the key, so lookups fall through to the
/// next scope.
#[derive(Debug, Default)]
pub struct Attributes {
    values: RwLock<HashMap<String, Value>>,
}

impl Attributes {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the value stored under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Check whether `key` is present.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Store a value, returning the previous one. `Value::Null` removes.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        match value.into() {
            Value::Null => self.write().remove(&key),
            value => self.write().insert(key, value),
        }
    }

    /// Remove a value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    /// Attribute names (unordered).
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of all attributes.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.read().clone()
    }

    // A panic while holding the lock leaves the map itself intact.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v): &(String, Value)| !v.is_null())
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}
