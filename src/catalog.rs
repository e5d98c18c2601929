//! Upgrade definitions loaded from `assets/upgrades.toml`.
//!
//! Each `[[upgrade]]` table describes one leveled stat:
//!
//! ```toml
//! [[upgrade]]
//! key = "MoveSpeed"
//! display_name = "Move Speed"
//! base_value = 5.0
//! increment_per_level = 0.5
//! max_level = 10
//! unit_suffix = " m/s"
//! ```
//!
//! The catalog order is the item order of the upgrade panel; the position of
//! a definition is the index carried by [`crate::plugin::UpgradeRequest`].
//! Keys join definitions to persisted levels, so they must be unique, stable
//! across sessions, and distinct from [`SKILL_POINTS_KEY`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::{DEFAULT_MAX_LEVEL, SKILL_POINTS_KEY};
use crate::error::CatalogError;

/// Static description of one upgradeable stat. Immutable at runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpgradeDefinition {
    /// Store key for this upgrade's level.
    pub key: String,
    /// Label shown in the panel; falls back to `key` when empty.
    #[serde(default)]
    pub display_name: String,
    pub base_value: f32,
    pub increment_per_level: f32,
    /// Highest reachable level (inclusive).
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub is_percentage: bool,
    #[serde(default)]
    pub unit_suffix: String,
}

fn default_max_level() -> u32 {
    DEFAULT_MAX_LEVEL
}

impl UpgradeDefinition {
    pub fn new(
        key: impl Into<String>,
        base_value: f32,
        increment_per_level: f32,
        max_level: u32,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: String::new(),
            base_value,
            increment_per_level,
            max_level,
            is_percentage: false,
            unit_suffix: String::new(),
        }
    }

    /// Stat value at `level`: `base_value + increment_per_level × level`.
    #[inline]
    pub fn value_at(&self, level: u32) -> f32 {
        self.base_value + self.increment_per_level * level as f32
    }

    #[inline]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.key
        } else {
            &self.display_name
        }
    }

    /// Text shown for `value`: one decimal for percentages, shortest
    /// representation otherwise, followed by the unit suffix.
    pub fn format_value(&self, value: f32) -> String {
        if self.is_percentage {
            format!("{:.1}{}", value, self.unit_suffix)
        } else {
            format!("{}{}", value, self.unit_suffix)
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    upgrade: Vec<UpgradeDefinition>,
}

/// Ordered, validated set of upgrade definitions.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct UpgradeCatalog {
    definitions: Vec<UpgradeDefinition>,
}

impl UpgradeCatalog {
    /// Validate and wrap `definitions`, keeping their order.
    pub fn new(definitions: Vec<UpgradeDefinition>) -> Result<Self, CatalogError> {
        validate(&definitions)?;
        Ok(Self { definitions })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.upgrade)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(
            "Loaded {} upgrade definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&UpgradeDefinition> {
        self.definitions.get(index)
    }

    #[inline]
    pub fn definitions(&self) -> &[UpgradeDefinition] {
        &self.definitions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate(definitions: &[UpgradeDefinition]) -> Result<(), CatalogError> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(definitions.len());
    for (index, def) in definitions.iter().enumerate() {
        if def.key.trim().is_empty() {
            return Err(CatalogError::EmptyKey { index });
        }
        if def.key == SKILL_POINTS_KEY {
            return Err(CatalogError::ReservedKey {
                key: def.key.clone(),
            });
        }
        if let Some(&first) = seen.get(def.key.as_str()) {
            return Err(CatalogError::DuplicateKey {
                key: def.key.clone(),
                first,
                second: index,
            });
        }
        seen.insert(def.key.as_str(), index);
    }
    Ok(())
}
