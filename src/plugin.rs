//! Bevy integration for the ledger: messages, resources and `UpgradeLedgerPlugin`.
//!
//! ## Resources
//!
//! | Resource          | Inserted by      | Purpose                                   |
//! |-------------------|------------------|-------------------------------------------|
//! | `SkillLedger`     | app / tests      | Ledger over the active store              |
//! | `UpgradeCatalog`  | app / tests      | Tracked definitions (item order)          |
//! | `LedgerConfig`    | plugin (default) | Popup and effect timings                  |
//! | `UpgradeDisplay`  | plugin           | Latest values pushed by the coordinator   |
//!
//! ## Systems (registered by `UpgradeLedgerPlugin`)
//!
//! | System                            | Schedule  | Purpose                              |
//! |-----------------------------------|-----------|--------------------------------------|
//! | `initial_refresh_system`          | `Startup` | Fill the display from the ledger     |
//! | `handle_upgrade_requests_system`  | `Update`  | Apply `UpgradeRequest` messages      |
//! | `handle_reset_requests_system`    | `Update`  | Apply `ResetUpgradesRequest`         |
//! | `handle_grant_requests_system`    | `Update`  | Apply `GrantSkillPoints`             |
//! | `error_popup_countdown_system`    | `Update`  | Hide the error popup after a delay   |
//!
//! The ledger and catalog are not created here: the binary loads them from
//! disk, tests insert in-memory versions.

use bevy::prelude::*;

use crate::catalog::UpgradeCatalog;
use crate::config::LedgerConfig;
use crate::coordinator::{UpgradeCoordinator, UpgradePresenter};
use crate::ledger::UpgradeLedger;
use crate::store::SharedStore;

// ── Messages ──────────────────────────────────────────────────────────────────

/// Player asked to raise the item at `index` (catalog order) by one level.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub index: usize,
}

/// Player asked to refund every upgrade.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetUpgradesRequest;

/// Credit skill points to the balance.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantSkillPoints {
    pub amount: u32,
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// The player's ledger over whichever store the app was started with.
#[derive(Resource)]
pub struct SkillLedger(pub UpgradeLedger<SharedStore>);

impl SkillLedger {
    pub fn new(store: SharedStore, starting_points: u32) -> Self {
        Self(UpgradeLedger::with_starting_points(store, starting_points))
    }
}

/// What one upgrade row currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDisplay {
    pub value_text: String,
    pub level_text: String,
    pub slider: f32,
    /// The item is at its level cap.
    pub maxed: bool,
}

/// Visible error popup and the seconds it has left.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub message: String,
    pub remaining: f32,
}

/// Presentation model written by the coordinator and read by the UI.
///
/// Headless apps can inspect it directly; the UI plugin mirrors it into text
/// and bar nodes whenever it changes.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct UpgradeDisplay {
    pub items: Vec<ItemDisplay>,
    pub skill_points_text: String,
    pub error: Option<ErrorPopup>,
    /// Items whose success effect has not been played yet, each listed once.
    pub pending_success: Vec<usize>,
    /// Lifetime given to the next error popup.
    pub error_popup_secs: f32,
}

impl UpgradeDisplay {
    fn item_mut(&mut self, index: usize) -> &mut ItemDisplay {
        if self.items.len() <= index {
            self.items.resize_with(index + 1, ItemDisplay::default);
        }
        &mut self.items[index]
    }

    /// Count down the popup; returns `true` when it was hidden this tick.
    pub fn tick_error(&mut self, dt: f32) -> bool {
        let Some(popup) = self.error.as_mut() else {
            return false;
        };
        popup.remaining -= dt;
        if popup.remaining <= 0.0 {
            self.error = None;
            true
        } else {
            false
        }
    }

    /// Hand over the pending success effects, leaving the queue empty.
    pub fn take_success(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.pending_success)
    }
}

impl UpgradePresenter for UpgradeDisplay {
    fn set_value_text(&mut self, index: usize, text: String) {
        self.item_mut(index).value_text = text;
    }

    fn set_level_text(&mut self, index: usize, text: String) {
        self.item_mut(index).level_text = text;
    }

    fn set_slider(&mut self, index: usize, value: f32) {
        self.item_mut(index).slider = value;
    }

    fn set_maxed(&mut self, index: usize, maxed: bool) {
        self.item_mut(index).maxed = maxed;
    }

    fn set_skill_points_text(&mut self, text: String) {
        self.skill_points_text = text;
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(ErrorPopup {
            message: message.to_string(),
            remaining: self.error_popup_secs,
        });
    }

    /// Repeat upgrades of an item before the UI drains the queue share one
    /// effect, so the queue never outgrows the catalog when no UI runs.
    fn play_success(&mut self, index: usize) {
        if !self.pending_success.contains(&index) {
            self.pending_success.push(index);
        }
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the ledger messages, the display model and the request handlers.
///
/// `SkillLedger` and `UpgradeCatalog` must be inserted before the first
/// update. `LedgerConfig` is initialised to its defaults if absent.
pub struct UpgradeLedgerPlugin;

impl Plugin for UpgradeLedgerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LedgerConfig>()
            .init_resource::<UpgradeDisplay>()
            .add_message::<UpgradeRequest>()
            .add_message::<ResetUpgradesRequest>()
            .add_message::<GrantSkillPoints>()
            .add_systems(Startup, initial_refresh_system)
            .add_systems(
                Update,
                (
                    handle_upgrade_requests_system,
                    handle_reset_requests_system,
                    handle_grant_requests_system,
                    error_popup_countdown_system,
                )
                    .chain(),
            );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Size the display to the catalog and push the persisted values once.
pub fn initial_refresh_system(
    config: Res<LedgerConfig>,
    catalog: Res<UpgradeCatalog>,
    mut ledger: ResMut<SkillLedger>,
    mut display: ResMut<UpgradeDisplay>,
) {
    display.error_popup_secs = config.error_popup_secs;
    display.items = vec![ItemDisplay::default(); catalog.len()];
    UpgradeCoordinator::new(&mut ledger.0, catalog.definitions(), &mut *display)
        .refresh_display();
    // `display` cannot appear inside a log macro: tracing's field helpers
    // shadow it there.
    let points = display.skill_points_text.clone();
    info!("Upgrade panel ready: {} items, {}", catalog.len(), points);
}

pub fn handle_upgrade_requests_system(
    mut requests: MessageReader<UpgradeRequest>,
    catalog: Res<UpgradeCatalog>,
    mut ledger: ResMut<SkillLedger>,
    mut display: ResMut<UpgradeDisplay>,
) {
    for request in requests.read() {
        UpgradeCoordinator::new(&mut ledger.0, catalog.definitions(), &mut *display)
            .on_upgrade_requested(request.index);
    }
}

pub fn handle_reset_requests_system(
    mut requests: MessageReader<ResetUpgradesRequest>,
    catalog: Res<UpgradeCatalog>,
    mut ledger: ResMut<SkillLedger>,
    mut display: ResMut<UpgradeDisplay>,
) {
    // Several presses in one frame collapse into one reset; the rest would
    // refund nothing.
    if requests.read().count() == 0 {
        return;
    }
    UpgradeCoordinator::new(&mut ledger.0, catalog.definitions(), &mut *display)
        .on_reset_requested();
}

pub fn handle_grant_requests_system(
    mut requests: MessageReader<GrantSkillPoints>,
    catalog: Res<UpgradeCatalog>,
    mut ledger: ResMut<SkillLedger>,
    mut display: ResMut<UpgradeDisplay>,
) {
    for request in requests.read() {
        UpgradeCoordinator::new(&mut ledger.0, catalog.definitions(), &mut *display)
            .on_points_granted(request.amount);
    }
}

/// Hide the error popup once its lifetime runs out.
pub fn error_popup_countdown_system(time: Res<Time>, mut display: ResMut<UpgradeDisplay>) {
    // Only take a mutable borrow while a popup is up, so change detection
    // stays quiet the rest of the time.
    if display.error.is_none() {
        return;
    }
    display.tick_error(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_hides_after_its_lifetime() {
        let mut display = UpgradeDisplay {
            error_popup_secs: 2.0,
            ..Default::default()
        };
        display.show_error("Not enough skill points.");

        assert!(!display.tick_error(1.5));
        assert!(display.error.is_some());
        assert!(display.tick_error(0.6));
        assert!(display.error.is_none());
        assert!(!display.tick_error(1.0));
    }

    #[test]
    fn new_error_restarts_the_countdown() {
        let mut display = UpgradeDisplay {
            error_popup_secs: 2.0,
            ..Default::default()
        };
        display.show_error("Not enough skill points.");
        display.tick_error(1.9);
        display.show_error("Maximum level reached.");

        let popup = display.error.as_ref().unwrap();
        assert_eq!(popup.message, "Maximum level reached.");
        assert_eq!(popup.remaining, 2.0);
    }

    #[test]
    fn presenter_grows_items_on_demand() {
        let mut display = UpgradeDisplay::default();
        display.set_level_text(2, "Lvl 4".to_string());
        assert_eq!(display.items.len(), 3);
        assert_eq!(display.items[2].level_text, "Lvl 4");
    }

    #[test]
    fn success_queue_drains_once() {
        let mut display = UpgradeDisplay::default();
        display.play_success(1);
        display.play_success(0);
        assert_eq!(display.take_success(), vec![1, 0]);
        assert!(display.take_success().is_empty());
    }

    #[test]
    fn success_queue_lists_each_item_once() {
        let mut display = UpgradeDisplay::default();
        for _ in 0..40 {
            display.play_success(2);
        }
        display.play_success(0);
        assert_eq!(display.pending_success, vec![2, 0]);
    }

    #[test]
    fn presenter_records_maxed_flag() {
        let mut display = UpgradeDisplay::default();
        display.set_maxed(1, true);
        assert!(!display.items[0].maxed);
        assert!(display.items[1].maxed);
    }
}
