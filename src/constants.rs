//! Centralised ledger and presentation constants.
//!
//! These are the authoritative defaults used by `LedgerConfig::default()`.
//! Override any of them at runtime through `assets/ledger.toml`.

// ── Persistence ───────────────────────────────────────────────────────────────

/// Store key holding the skill-point balance.
///
/// Upgrade definitions may not use this key; the catalog rejects it.
pub const SKILL_POINTS_KEY: &str = "SkillPoints";

/// Where the durable key-value store is written.
pub const SAVE_PATH: &str = "saves/ledger.toml";

/// Where the upgrade definitions are read from.
pub const CATALOG_PATH: &str = "assets/upgrades.toml";

/// Where [`crate::config::LedgerConfig`] is read from.
pub const CONFIG_PATH: &str = "assets/ledger.toml";

// ── Economy ───────────────────────────────────────────────────────────────────

/// Balance reported for a store that has never recorded one.
pub const STARTING_SKILL_POINTS: u32 = 0;

/// Max level used when a definition omits `max_level`.
pub const DEFAULT_MAX_LEVEL: u32 = 100;

/// Points granted per press of the debug grant key.
pub const GRANT_POINTS_PER_PRESS: u32 = 1;

// ── Presentation ──────────────────────────────────────────────────────────────

/// Seconds the error popup stays visible.
pub const ERROR_POPUP_SECS: f32 = 2.0;

/// Duration of the level-text scale-in played after a successful upgrade.
pub const SUCCESS_POP_SECS: f32 = 0.2;

/// Font size of the per-item level text at rest.
pub const LEVEL_FONT_SIZE: f32 = 16.0;
