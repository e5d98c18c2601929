//! Skill-point ledger: balance, per-upgrade levels and the two guarded
//! mutations (upgrade one level, reset everything).
//!
//! The ledger keeps no state of its own. Every read goes to the injected
//! [`PointStore`] and every mutation is written back before the call returns.
//!
//! ## Store layout
//!
//! | Key                       | Value                         |
//! |---------------------------|-------------------------------|
//! | [`SKILL_POINTS_KEY`]      | spendable balance             |
//! | `UpgradeDefinition::key`  | current level of that upgrade |
//!
//! Values below zero found in the store are read as zero, so a damaged save
//! can never produce a negative balance or level.

use bevy::log::{debug, info};

use crate::catalog::UpgradeDefinition;
use crate::constants::{SKILL_POINTS_KEY, STARTING_SKILL_POINTS};
use crate::error::UpgradeError;
use crate::store::PointStore;

#[derive(Debug)]
pub struct UpgradeLedger<S> {
    store: S,
    starting_points: u32,
}

impl<S: PointStore> UpgradeLedger<S> {
    pub fn new(store: S) -> Self {
        Self::with_starting_points(store, STARTING_SKILL_POINTS)
    }

    /// `starting_points` is the balance reported while the store has no
    /// balance entry yet.
    pub fn with_starting_points(store: S, starting_points: u32) -> Self {
        Self {
            store,
            starting_points,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Balance ──────────────────────────────────────────────────────────────

    pub fn skill_points(&self) -> u32 {
        read_clamped(
            &self.store,
            SKILL_POINTS_KEY,
            i64::from(self.starting_points),
        )
    }

    pub fn set_skill_points(&mut self, points: u32) {
        self.store.set_int(SKILL_POINTS_KEY, i64::from(points));
    }

    /// Credit `amount` points (saturating at `u32::MAX`).
    pub fn add_skill_points(&mut self, amount: u32) {
        let total = self.skill_points().saturating_add(amount);
        self.set_skill_points(total);
        debug!("Granted {} skill points (balance {})", amount, total);
    }

    // ── Levels ───────────────────────────────────────────────────────────────

    /// Current level of the upgrade stored under `key`; 0 if never set.
    pub fn level(&self, key: &str) -> u32 {
        read_clamped(&self.store, key, 0)
    }

    fn set_level(&mut self, key: &str, level: u32) {
        self.store.set_int(key, i64::from(level));
    }

    /// Derived stat value for `def` at its persisted level.
    pub fn value(&self, def: &UpgradeDefinition) -> f32 {
        def.value_at(self.level(&def.key))
    }

    #[inline]
    pub fn is_maxed(&self, def: &UpgradeDefinition) -> bool {
        self.level(&def.key) >= def.max_level
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Spend one point to raise `def` by one level.
    ///
    /// The level cap is checked before the balance, so a maxed upgrade reports
    /// [`UpgradeError::MaxLevelReached`] even when the balance is also zero.
    /// Nothing is written when the attempt fails.
    pub fn try_upgrade(&mut self, def: &UpgradeDefinition) -> Result<(), UpgradeError> {
        let level = self.level(&def.key);
        if level >= def.max_level {
            debug!("Upgrade '{}' rejected: level {} is max", def.key, level);
            return Err(UpgradeError::MaxLevelReached);
        }

        let points = self.skill_points();
        if points == 0 {
            debug!("Upgrade '{}' rejected: no skill points", def.key);
            return Err(UpgradeError::InsufficientPoints);
        }

        self.set_level(&def.key, level + 1);
        self.set_skill_points(points - 1);
        debug!(
            "Upgraded '{}' to level {} ({} points left)",
            def.key,
            level + 1,
            points - 1
        );
        Ok(())
    }

    /// Points that [`Self::reset_all`] would refund for `defs`.
    pub fn total_refund<'a, I>(&self, defs: I) -> u32
    where
        I: IntoIterator<Item = &'a UpgradeDefinition>,
    {
        defs.into_iter()
            .fold(0u32, |acc, def| acc.saturating_add(self.level(&def.key)))
    }

    /// Zero every level in `defs` and credit the summed levels back in a
    /// single balance write. Returns the refunded amount.
    ///
    /// Calling it again immediately refunds nothing.
    pub fn reset_all<'a, I>(&mut self, defs: I) -> u32
    where
        I: IntoIterator<Item = &'a UpgradeDefinition>,
        I::IntoIter: Clone,
    {
        let defs = defs.into_iter();
        let refunded = self.total_refund(defs.clone());
        for def in defs {
            self.set_level(&def.key, 0);
        }

        let balance = self.skill_points().saturating_add(refunded);
        self.set_skill_points(balance);
        info!("Reset upgrades: refunded {} points (balance {})", refunded, balance);
        refunded
    }
}

fn read_clamped<S: PointStore>(store: &S, key: &str, default: i64) -> u32 {
    let raw = store.get_int(key, default);
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ledger_with_points(points: u32) -> UpgradeLedger<MemoryStore> {
        let mut ledger = UpgradeLedger::new(MemoryStore::new());
        ledger.set_skill_points(points);
        ledger
    }

    fn armor() -> UpgradeDefinition {
        UpgradeDefinition::new("Armor", 10.0, 2.0, 3)
    }

    #[test]
    fn unseen_keys_read_as_zero() {
        let ledger = UpgradeLedger::new(MemoryStore::new());
        assert_eq!(ledger.skill_points(), 0);
        assert_eq!(ledger.level("Armor"), 0);
        assert_eq!(ledger.value(&armor()), 10.0);
    }

    #[test]
    fn starting_points_apply_only_to_fresh_store() {
        let fresh = UpgradeLedger::with_starting_points(MemoryStore::new(), 5);
        assert_eq!(fresh.skill_points(), 5);

        let saved = UpgradeLedger::with_starting_points(
            MemoryStore::with_entries([(SKILL_POINTS_KEY, 1)]),
            5,
        );
        assert_eq!(saved.skill_points(), 1);
    }

    #[test]
    fn value_tracks_successful_upgrades() {
        let def = UpgradeDefinition::new("Speed", 1.5, 0.25, 8);
        let mut ledger = ledger_with_points(20);

        for level in 0..def.max_level {
            let expected = def.base_value + def.increment_per_level * level as f32;
            assert_eq!(ledger.value(&def), expected);
            ledger.try_upgrade(&def).unwrap();
        }
        assert_eq!(ledger.level("Speed"), 8);
        assert_eq!(ledger.skill_points(), 12);
    }

    #[test]
    fn single_point_scenario() {
        let def = armor();
        let mut ledger = ledger_with_points(1);

        assert_eq!(ledger.try_upgrade(&def), Ok(()));
        assert_eq!(ledger.level("Armor"), 1);
        assert_eq!(ledger.skill_points(), 0);
        assert_eq!(ledger.value(&def), 12.0);

        assert_eq!(
            ledger.try_upgrade(&def),
            Err(UpgradeError::InsufficientPoints)
        );
    }

    #[test]
    fn max_level_wins_over_empty_balance() {
        let def = armor();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([("Armor", 3)]));
        assert_eq!(ledger.try_upgrade(&def), Err(UpgradeError::MaxLevelReached));
    }

    #[test]
    fn max_level_rejected_even_with_points() {
        let def = armor();
        let mut ledger = ledger_with_points(4);
        for _ in 0..3 {
            ledger.try_upgrade(&def).unwrap();
        }
        assert!(ledger.is_maxed(&def));
        assert_eq!(ledger.try_upgrade(&def), Err(UpgradeError::MaxLevelReached));
        assert_eq!(ledger.skill_points(), 1);
        assert_eq!(ledger.level("Armor"), 3);
    }

    #[test]
    fn zero_max_level_is_always_maxed() {
        let def = UpgradeDefinition::new("Locked", 1.0, 1.0, 0);
        let mut ledger = ledger_with_points(3);
        assert_eq!(ledger.try_upgrade(&def), Err(UpgradeError::MaxLevelReached));
    }

    #[test]
    fn failed_upgrade_writes_nothing() {
        let def = armor();
        let mut ledger = UpgradeLedger::new(MemoryStore::new());
        assert!(ledger.try_upgrade(&def).is_err());

        let store = ledger.into_store();
        assert_eq!(store.raw("Armor"), None);
        assert_eq!(store.raw(SKILL_POINTS_KEY), None);
    }

    #[test]
    fn reset_refunds_all_levels_at_once() {
        let d1 = UpgradeDefinition::new("Armor", 0.0, 1.0, 10);
        let d2 = UpgradeDefinition::new("Speed", 0.0, 1.0, 10);
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([
            ("Armor", 3),
            ("Speed", 5),
            (SKILL_POINTS_KEY, 2),
        ]));

        assert_eq!(ledger.total_refund([&d1, &d2]), 8);
        assert_eq!(ledger.reset_all([&d1, &d2]), 8);
        assert_eq!(ledger.skill_points(), 10);
        assert_eq!(ledger.level("Armor"), 0);
        assert_eq!(ledger.level("Speed"), 0);
    }

    #[test]
    fn reset_is_idempotent() {
        let defs = vec![
            UpgradeDefinition::new("Armor", 0.0, 1.0, 10),
            UpgradeDefinition::new("Speed", 0.0, 1.0, 10),
        ];
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([
            ("Armor", 3),
            ("Speed", 5),
            (SKILL_POINTS_KEY, 2),
        ]));

        ledger.reset_all(&defs);
        assert_eq!(ledger.reset_all(&defs), 0);
        assert_eq!(ledger.skill_points(), 10);
    }

    #[test]
    fn reset_keeps_entries_at_zero() {
        let def = armor();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([("Armor", 2)]));
        ledger.reset_all([&def]);
        assert_eq!(ledger.store().raw("Armor"), Some(0));
    }

    #[test]
    fn negative_stored_values_read_as_zero() {
        let ledger = UpgradeLedger::new(MemoryStore::with_entries([
            (SKILL_POINTS_KEY, -4),
            ("Armor", -1),
        ]));
        assert_eq!(ledger.skill_points(), 0);
        assert_eq!(ledger.level("Armor"), 0);
    }

    #[test]
    fn add_points_saturates() {
        let mut ledger = ledger_with_points(u32::MAX - 1);
        ledger.add_skill_points(5);
        assert_eq!(ledger.skill_points(), u32::MAX);
    }
}
