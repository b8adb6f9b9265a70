//! Persisted user preferences (recently viewed, size choice, UI toggles).
//!
//! Values are stored as JSON strings in a [`Storage`]. Reads that find
//! nothing, or something that no longer parses, fall back to the caller's
//! default. Every handle cloned from one `Preferences` sees the writes of
//! the others as [`PreferenceChange`] events.
//!
//! Change events stay within one `Preferences` and its clones. Two
//! `Preferences` opened separately on the same file share the data but not
//! the events: each sees the other's writes on its next `get`, not as a
//! `PreferenceChange`. Open the file once and clone the handle.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::SdkError;

const CHANGE_CAPACITY: usize = 32;

/// Raw string key-value storage. Values are JSON documents, as written by
/// [`Preferences::set`].
pub trait Storage: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, SdkError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SdkError>;
    fn remove(&self, key: &str) -> Result<(), SdkError>;
}

// ─── MemoryStorage ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SdkError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SdkError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SdkError> {
        self.lock().remove(key);
        Ok(())
    }
}

// ─── FileStorage ─────────────────────────────────────────────────────────────

/// All preferences in one JSON object on disk, rewritten on every change.
///
/// Values are kept as JSON inside that object, so `set` refuses a value that
/// is not a JSON document rather than storing something `get` would not
/// hand back unchanged.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

type FileMap = BTreeMap<String, serde_json::Value>;

impl FileStorage {
    /// The file is created on first write; a missing file reads as empty.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<FileMap, SdkError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(FileMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &FileMap) -> Result<(), SdkError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut FileMap)) -> Result<(), SdkError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut map = self.load()?;
        f(&mut map);
        self.save(&map)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SdkError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.load()?.get(key).map(|v| v.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SdkError> {
        let value: serde_json::Value = serde_json::from_str(value)?;
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), SdkError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

// ─── Preferences ─────────────────────────────────────────────────────────────

/// A preference written through some handle. `value` is the raw JSON, or
/// `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceChange {
    pub key: String,
    pub value: Option<String>,
}

impl PreferenceChange {
    /// The new value, or `default` if removed or unparseable.
    pub fn value_or<T: DeserializeOwned>(&self, default: T) -> T {
        self.value
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or(default)
    }
}

/// Typed read/write-through access to a [`Storage`].
///
/// Cloning yields another handle on the same storage and change channel.
pub struct Preferences<S: Storage> {
    storage: Arc<S>,
    tx: broadcast::Sender<PreferenceChange>,
}

impl<S: Storage> Clone for Preferences<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            tx: self.tx.clone(),
        }
    }
}

impl<S: Storage> Preferences<S> {
    pub fn new(storage: S) -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            storage: Arc::new(storage),
            tx,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The stored value for `key`, or `default` when missing or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, error = %e, "Reading preference failed");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "Unparseable preference, using default");
                default
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), SdkError> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(key, &raw)?;
        self.notify(key, Some(raw));
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), SdkError> {
        self.storage.remove(key)?;
        self.notify(key, None);
        Ok(())
    }

    /// Changes made through any handle of this preferences set.
    pub fn subscribe(&self) -> broadcast::Receiver<PreferenceChange> {
        self.tx.subscribe()
    }

    fn notify(&self, key: &str, value: Option<String>) {
        let _ = self.tx.send(PreferenceChange {
            key: key.to_string(),
            value,
        });
    }
}

impl<S: Storage + std::fmt::Debug> std::fmt::Debug for Preferences<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
