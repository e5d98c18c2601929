//! Integer key-value stores backing the ledger.
//!
//! The ledger only needs two calls, `get_int` and `set_int`, so any local
//! key-value mechanism can stand behind it:
//!
//! | Store           | Durability                         | Used by               |
//! |-----------------|------------------------------------|-----------------------|
//! | [`MemoryStore`]   | process lifetime                   | tests, fallback       |
//! | [`TomlFileStore`] | flat TOML table, rewritten per set | the game binary       |
//!
//! `set_int` is infallible from the ledger's point of view. A store that can
//! fail to persist logs the failure and keeps serving the value it was given.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use bevy::log::{error, info};

use crate::error::{StoreError, StoreResult};

/// Minimal read/write contract for persisted integers.
pub trait PointStore: Send + Sync {
    /// Value stored under `key`, or `default` when the key has never been set.
    fn get_int(&self, key: &str, default: i64) -> i64;

    /// Store `value` under `key`, replacing any previous value.
    fn set_int(&mut self, key: &str, value: i64);
}

/// Type-erased store so a Bevy resource can own any backend.
pub type SharedStore = Box<dyn PointStore>;

impl<S: PointStore + ?Sized> PointStore for Box<S> {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        (**self).get_int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        (**self).set_int(key, value)
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Non-durable store; everything is lost when it is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `entries`.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self {
            values: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Raw access for assertions; `None` means the key was never written.
    pub fn raw(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }
}

impl PointStore for MemoryStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

// ── TOML file ─────────────────────────────────────────────────────────────────

/// Durable store kept as a flat TOML table:
///
/// ```toml
/// MoveSpeed = 2
/// SkillPoints = 7
/// ```
///
/// The table is mirrored in memory and written back in full on every
/// `set_int`, so the file always matches what the ledger last wrote.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl TomlFileStore {
    /// Open the store at `path`. A missing file is an empty store; a file
    /// that exists but cannot be read or parsed is an error.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str::<BTreeMap<String, i64>>(&contents).map_err(|source| {
                StoreError::Parse {
                    path: path.clone(),
                    source,
                }
            })?
        } else {
            BTreeMap::new()
        };

        info!(
            "Opened ledger store {} ({} entries)",
            path.display(),
            values.len()
        );
        Ok(Self { path, values })
    }

    /// Write the whole table to disk, creating the parent directory if needed.
    pub fn flush(&self) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let serialized = toml::to_string(&self.values).map_err(StoreError::Serialize)?;
        fs::write(&self.path, serialized).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl PointStore for TomlFileStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            error!("Failed to persist '{}' = {}: {}", key, value, err);
        }
    }
}
