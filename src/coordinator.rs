//! Routes player intents to the ledger and pushes refreshed values to the
//! presentation layer.
//!
//! The coordinator owns nothing: it borrows the ledger, the tracked
//! definitions and a presenter for the duration of one request.

use bevy::log::warn;

use crate::catalog::UpgradeDefinition;
use crate::ledger::UpgradeLedger;
use crate::store::PointStore;

/// Output sink for the upgrade panel. The coordinator never reads back from it.
pub trait UpgradePresenter {
    fn set_value_text(&mut self, index: usize, text: String);
    fn set_level_text(&mut self, index: usize, text: String);
    /// Progress value for the item; the current level.
    fn set_slider(&mut self, index: usize, value: f32);
    /// Whether the item has reached its level cap.
    fn set_maxed(&mut self, index: usize, maxed: bool);
    fn set_skill_points_text(&mut self, text: String);
    /// Show a transient error message.
    fn show_error(&mut self, message: &str);
    /// Play the success effect anchored at item `index`.
    fn play_success(&mut self, index: usize);
}

pub struct UpgradeCoordinator<'a, S, P> {
    ledger: &'a mut UpgradeLedger<S>,
    definitions: &'a [UpgradeDefinition],
    presenter: &'a mut P,
}

impl<'a, S, P> UpgradeCoordinator<'a, S, P>
where
    S: PointStore,
    P: UpgradePresenter,
{
    pub fn new(
        ledger: &'a mut UpgradeLedger<S>,
        definitions: &'a [UpgradeDefinition],
        presenter: &'a mut P,
    ) -> Self {
        Self {
            ledger,
            definitions,
            presenter,
        }
    }

    /// Upgrade the item at `index`. The display is refreshed whether or not
    /// the upgrade went through.
    pub fn on_upgrade_requested(&mut self, index: usize) {
        match self.definitions.get(index) {
            Some(def) => match self.ledger.try_upgrade(def) {
                Ok(()) => self.presenter.play_success(index),
                Err(err) => self.presenter.show_error(err.message()),
            },
            None => warn!(
                "Upgrade requested for item {} but only {} are tracked",
                index,
                self.definitions.len()
            ),
        }
        self.refresh_display();
    }

    /// Refund every tracked upgrade, then refresh.
    pub fn on_reset_requested(&mut self) {
        self.ledger.reset_all(self.definitions);
        self.refresh_display();
    }

    /// Credit `amount` points, then refresh.
    pub fn on_points_granted(&mut self, amount: u32) {
        self.ledger.add_skill_points(amount);
        self.refresh_display();
    }

    pub fn refresh_display(&mut self) {
        for (index, def) in self.definitions.iter().enumerate() {
            let value = self.ledger.value(def);
            let level = self.ledger.level(&def.key);

            self.presenter.set_value_text(index, def.format_value(value));
            self.presenter.set_level_text(index, format!("Lvl {level}"));
            self.presenter.set_slider(index, level as f32);
            self.presenter.set_maxed(index, self.ledger.is_maxed(def));
        }

        self.presenter
            .set_skill_points_text(format!("Skill Points: {}", self.ledger.skill_points()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SKILL_POINTS_KEY;
    use crate::store::MemoryStore;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Value(usize, String),
        Level(usize, String),
        Slider(usize, f32),
        Maxed(usize, bool),
        Points(String),
        Error(String),
        Success(usize),
    }

    #[derive(Default)]
    struct RecordingPresenter {
        calls: Vec<Call>,
    }

    impl UpgradePresenter for RecordingPresenter {
        fn set_value_text(&mut self, index: usize, text: String) {
            self.calls.push(Call::Value(index, text));
        }
        fn set_level_text(&mut self, index: usize, text: String) {
            self.calls.push(Call::Level(index, text));
        }
        fn set_slider(&mut self, index: usize, value: f32) {
            self.calls.push(Call::Slider(index, value));
        }
        fn set_maxed(&mut self, index: usize, maxed: bool) {
            self.calls.push(Call::Maxed(index, maxed));
        }
        fn set_skill_points_text(&mut self, text: String) {
            self.calls.push(Call::Points(text));
        }
        fn show_error(&mut self, message: &str) {
            self.calls.push(Call::Error(message.to_string()));
        }
        fn play_success(&mut self, index: usize) {
            self.calls.push(Call::Success(index));
        }
    }

    fn definitions() -> Vec<UpgradeDefinition> {
        let mut crit = UpgradeDefinition::new("Crit", 2.0, 1.5, 5);
        crit.is_percentage = true;
        crit.unit_suffix = "%".to_string();
        vec![UpgradeDefinition::new("Armor", 10.0, 2.0, 3), crit]
    }

    #[test]
    fn successful_upgrade_plays_effect_then_refreshes() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([(SKILL_POINTS_KEY, 1)]));
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_upgrade_requested(0);

        assert_eq!(
            presenter.calls,
            vec![
                Call::Success(0),
                Call::Value(0, "12".to_string()),
                Call::Level(0, "Lvl 1".to_string()),
                Call::Slider(0, 1.0),
                Call::Maxed(0, false),
                Call::Value(1, "2.0%".to_string()),
                Call::Level(1, "Lvl 0".to_string()),
                Call::Slider(1, 0.0),
                Call::Maxed(1, false),
                Call::Points("Skill Points: 0".to_string()),
            ]
        );
    }

    #[test]
    fn failed_upgrade_shows_error_and_still_refreshes() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::new());
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_upgrade_requested(1);

        assert_eq!(
            presenter.calls.first(),
            Some(&Call::Error("Not enough skill points.".to_string()))
        );
        assert!(!presenter.calls.iter().any(|c| matches!(c, Call::Success(_))));
        assert_eq!(
            presenter.calls.last(),
            Some(&Call::Points("Skill Points: 0".to_string()))
        );
    }

    #[test]
    fn maxed_upgrade_reports_max_level() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([
            ("Armor", 3),
            (SKILL_POINTS_KEY, 4),
        ]));
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_upgrade_requested(0);

        assert_eq!(
            presenter.calls.first(),
            Some(&Call::Error("Maximum level reached.".to_string()))
        );
        assert_eq!(ledger.skill_points(), 4);
        assert!(presenter.calls.contains(&Call::Maxed(0, true)));
    }

    #[test]
    fn last_upgrade_marks_item_maxed() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([
            ("Armor", 2),
            (SKILL_POINTS_KEY, 1),
        ]));
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_upgrade_requested(0);

        assert!(presenter.calls.contains(&Call::Maxed(0, true)));
        assert!(presenter.calls.contains(&Call::Maxed(1, false)));
    }

    #[test]
    fn out_of_range_index_only_refreshes() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([(SKILL_POINTS_KEY, 2)]));
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_upgrade_requested(7);

        assert_eq!(presenter.calls.len(), 9);
        assert!(!presenter
            .calls
            .iter()
            .any(|c| matches!(c, Call::Success(_) | Call::Error(_))));
        assert_eq!(ledger.skill_points(), 2);
    }

    #[test]
    fn reset_refunds_tracked_items_and_refreshes() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::with_entries([
            ("Armor", 2),
            ("Crit", 4),
            (SKILL_POINTS_KEY, 1),
        ]));
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_reset_requested();

        assert_eq!(ledger.skill_points(), 7);
        assert!(presenter
            .calls
            .contains(&Call::Level(1, "Lvl 0".to_string())));
        assert_eq!(
            presenter.calls.last(),
            Some(&Call::Points("Skill Points: 7".to_string()))
        );
    }

    #[test]
    fn granted_points_show_up_in_total() {
        let defs = definitions();
        let mut ledger = UpgradeLedger::new(MemoryStore::new());
        let mut presenter = RecordingPresenter::default();

        UpgradeCoordinator::new(&mut ledger, &defs, &mut presenter).on_points_granted(3);

        assert_eq!(
            presenter.calls.last(),
            Some(&Call::Points("Skill Points: 3".to_string()))
        );
    }
}
