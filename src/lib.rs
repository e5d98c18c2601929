//! Skill-point upgrade ledger
//!
//! Players spend skill points to raise leveled stats described by static
//! definitions, inspect the derived values in an upgrade panel, and reset
//! everything for a full refund.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod plugin;
pub mod store;
pub mod ui;
