use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::error::StoreError;

/// String key/value backend underneath every persisted collection.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;

    /// Approximate bytes used by all stored keys and values.
    fn usage_bytes(&self) -> Result<usize> {
        let mut total = 0;
        for key in self.keys()? {
            let value = self.get(&key)?.unwrap_or_default();
            total += key.len() + value.len();
        }
        Ok(total)
    }
}

/// In-process storage, optionally capped at a byte quota like a browser's local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .entries
                .borrow()
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                bail!("Storage quota exceeded ({needed} > {quota} bytes)");
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

/// Upgrades a stored payload from an older schema version to the current one.
pub type Migration = fn(from_version: u32, data: Value) -> Result<Value, String>;

fn no_migration(_from: u32, data: Value) -> Result<Value, String> {
    Ok(data)
}

/// What is currently persisted under a store's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub key: String,
    pub exists: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

/// A whole collection persisted as one JSON value under one storage key.
///
/// Values are written as `{"version": N, "data": ...}`. A bare value without that
/// envelope is treated as version 0 and passed through the migration function.
pub struct PersistentStore<T> {
    storage: Rc<dyn Storage>,
    key: &'static str,
    version: u32,
    default: fn() -> T,
    migrate: Migration,
}

impl<T: Serialize + DeserializeOwned> PersistentStore<T> {
    pub fn new(storage: Rc<dyn Storage>, key: &'static str, default: fn() -> T) -> Self {
        Self {
            storage,
            key,
            version: 1,
            default,
            migrate: no_migration,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, version: u32, migrate: Migration) -> Self {
        self.version = version;
        self.migrate = migrate;
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the collection. Missing, unreadable, or corrupt values yield the default;
    /// a corrupt value is removed so the next save starts clean.
    pub fn load(&self) -> T {
        let raw = match self.storage.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (self.default)(),
            Err(e) => {
                warn!(key = self.key, "failed to read storage: {e:#}");
                return (self.default)();
            }
        };

        match self.decode(&raw) {
            Ok((value, _)) => value,
            Err(e) => {
                warn!(key = self.key, "{e}; resetting to default");
                if let Err(e) = self.storage.remove(self.key) {
                    warn!(key = self.key, "failed to discard corrupt value: {e:#}");
                }
                (self.default)()
            }
        }
    }

    /// Write the whole collection. Failures are logged and swallowed.
    pub fn save(&self, value: &T) {
        let encoded = json!({ "version": self.version, "data": value });
        match self.storage.set(self.key, &encoded.to_string()) {
            Ok(()) => debug!(key = self.key, "saved"),
            Err(e) => error!(key = self.key, "failed to save: {e:#}"),
        }
    }

    /// Report on the persisted value without modifying it.
    pub fn inspect(&self, count: impl Fn(&T) -> usize) -> StoreHealth {
        let mut health = StoreHealth {
            key: self.key.to_string(),
            exists: false,
            valid: true,
            version: None,
            count: None,
            problem: None,
        };
        match self.storage.get(self.key) {
            Ok(None) => {}
            Ok(Some(raw)) => {
                health.exists = true;
                match self.decode(&raw) {
                    Ok((value, version)) => {
                        health.version = Some(version);
                        health.count = Some(count(&value));
                    }
                    Err(e) => {
                        health.valid = false;
                        health.problem = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                health.valid = false;
                health.problem = Some(format!("{e:#}"));
            }
        }
        health
    }

    fn decode(&self, raw: &str) -> Result<(T, u32), StoreError> {
        let corrupt = |reason: String| StoreError::StorageCorrupt {
            key: self.key.to_string(),
            reason,
        };

        let parsed: Value = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
        let (version, data) = split_envelope(parsed);
        if version > self.version {
            return Err(corrupt(format!(
                "schema version {version} is newer than supported version {}",
                self.version
            )));
        }
        let data = if version < self.version {
            (self.migrate)(version, data).map_err(corrupt)?
        } else {
            data
        };
        let value = serde_json::from_value(data).map_err(|e| corrupt(e.to_string()))?;
        Ok((value, version))
    }
}

fn split_envelope(value: Value) -> (u32, Value) {
    let version = match &value {
        Value::Object(map) if map.len() == 2 && map.contains_key("data") => map
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok()),
        _ => None,
    };
    match (version, value) {
        (Some(version), Value::Object(mut map)) => {
            (version, map.remove("data").unwrap_or(Value::Null))
        }
        (_, value) => (0, value),
    }
}
