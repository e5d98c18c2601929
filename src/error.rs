//! Ledger error types.
//!
//! Upgrade failures are ordinary gameplay outcomes and are returned to the
//! caller, never raised as panics. Catalog and store errors carry enough
//! context to be logged once at the point where the app gives up on them.
//!
//! ## Usage
//!
//! ```rust
//! use upgrade_ledger::error::UpgradeError;
//!
//! let err = UpgradeError::InsufficientPoints;
//! assert_eq!(err.message(), "Not enough skill points.");
//! ```

use std::fmt;
use std::path::PathBuf;

// ── Upgrades ──────────────────────────────────────────────────────────────────

/// Why an upgrade attempt was rejected.
///
/// A rejected attempt never changes the balance or any level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    /// The upgrade is already at its definition's `max_level`.
    MaxLevelReached,
    /// The balance is zero.
    InsufficientPoints,
}

impl UpgradeError {
    /// Player-facing text shown in the error popup.
    pub fn message(self) -> &'static str {
        match self {
            UpgradeError::MaxLevelReached => "Maximum level reached.",
            UpgradeError::InsufficientPoints => "Not enough skill points.",
        }
    }
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for UpgradeError {}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// Failure while loading or validating upgrade definitions.
#[derive(Debug)]
pub enum CatalogError {
    /// The definitions file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The definitions file is not valid TOML or does not match the schema.
    Parse(toml::de::Error),

    /// A definition at `index` has an empty key.
    EmptyKey { index: usize },

    /// A definition uses the key reserved for the skill-point balance.
    ReservedKey { key: String },

    /// Two definitions share a key; both would read and write the same level.
    DuplicateKey {
        key: String,
        first: usize,
        second: usize,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            CatalogError::Parse(err) => write!(f, "failed to parse upgrade definitions: {err}"),
            CatalogError::EmptyKey { index } => {
                write!(f, "upgrade definition #{index} has an empty key")
            }
            CatalogError::ReservedKey { key } => {
                write!(f, "upgrade key '{key}' is reserved for the skill-point balance")
            }
            CatalogError::DuplicateKey { key, first, second } => write!(
                f,
                "upgrade key '{}' is used by definitions #{} and #{}",
                key, first, second
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Read { source, .. } => Some(source),
            CatalogError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Parse(err)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Failure in the durable key-value store.
#[derive(Debug)]
pub enum StoreError {
    /// The save file exists but could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The save file is not a flat table of integers.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The table could not be encoded.
    Serialize(toml::ser::Error),

    /// The save file (or its directory) could not be written.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            StoreError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            StoreError::Serialize(err) => write!(f, "failed to serialize ledger table: {err}"),
            StoreError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Read { source, .. } | StoreError::Write { source, .. } => Some(source),
            StoreError::Parse { source, .. } => Some(source),
            StoreError::Serialize(err) => Some(err),
        }
    }
}

/// Convenience alias: a `Result` using `StoreError` as the error type.
pub type StoreResult<T> = Result<T, StoreError>;
