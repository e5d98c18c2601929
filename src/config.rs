//! Runtime ledger configuration loaded from `assets/ledger.toml`.
//!
//! [`LedgerConfig`] is a Bevy [`Resource`] that mirrors the defaults in
//! [`crate::constants`]. [`load_ledger_config`] reads the file before the app
//! is built and overwrites the defaults with any values present. Missing keys
//! fall back to the compile-time defaults, so a minimal TOML can override just
//! the settings you care about:
//!
//! ```toml
//! starting_skill_points = 10
//! error_popup_secs = 3.0
//! ```

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::*;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    // ── Files ────────────────────────────────────────────────────────────────
    pub save_path: PathBuf,
    pub catalog_path: PathBuf,

    // ── Economy ──────────────────────────────────────────────────────────────
    /// Balance of a brand-new save.
    pub starting_skill_points: u32,
    pub grant_points_per_press: u32,

    // ── Presentation ─────────────────────────────────────────────────────────
    pub error_popup_secs: f32,
    pub success_pop_secs: f32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(SAVE_PATH),
            catalog_path: PathBuf::from(CATALOG_PATH),
            starting_skill_points: STARTING_SKILL_POINTS,
            grant_points_per_press: GRANT_POINTS_PER_PRESS,
            error_popup_secs: ERROR_POPUP_SECS,
            success_pop_secs: SUCCESS_POP_SECS,
        }
    }
}

/// Read `path` into a [`LedgerConfig`].
///
/// A missing file is not an error and yields the defaults. Parse errors are
/// printed to stderr and also yield the defaults; the game still starts.
pub fn load_ledger_config(path: impl AsRef<Path>) -> LedgerConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<LedgerConfig>(&contents) {
            Ok(loaded) => {
                println!("✓ Loaded ledger config from {}", path.display());
                loaded
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {}: {e}; using defaults", path.display());
                LedgerConfig::default()
            }
        },
        Err(_) => {
            println!("ℹ No {} found; using compiled defaults", path.display());
            LedgerConfig::default()
        }
    }
}
