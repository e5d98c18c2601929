//! Upgrade panel UI: layout, button wiring and feedback effects.
//!
//! The panel never talks to the ledger. Buttons and keys write the messages
//! defined in [`crate::plugin`]; the panel then mirrors [`UpgradeDisplay`]
//! into its text and bar nodes whenever the display changes.
//!
//! ## Systems (registered by `UpgradeUiPlugin`)
//!
//! | System                   | Schedule  | Purpose                                   |
//! |--------------------------|-----------|-------------------------------------------|
//! | `setup_upgrade_panel`    | `Startup` | Spawn camera and the panel                |
//! | `upgrade_button_system`  | `Update`  | UPGRADE / RESET presses → messages        |
//! | `button_hover_system`    | `Update`  | Tint buttons on hover                     |
//! | `keyboard_system`        | `Update`  | P grants points, ESC quits                |
//! | `sync_display_system`    | `Update`  | Copy `UpgradeDisplay` into the nodes      |
//! | `success_effect_system`  | `Update`  | Start a level-text pop per success        |
//! | `level_pop_system`       | `Update`  | Animate and finish level-text pops        |
//!
//! Layout:
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 UPGRADES                     │
//! │             Skill Points: 3                  │
//! │  Move Speed   5.5 m/s  Lvl 1  [███░░] [UPGRADE]│
//! │  Crit Chance  3.5%     Lvl 1  [█░░░░] [UPGRADE]│
//! │  Armor        16       Lvl 3  [█████] [  MAX  ]│
//! │                 [ RESET ]                    │
//! │         P: +1 point  ·  ESC: quit            │
//! └──────────────────────────────────────────────┘
//! ```

use bevy::prelude::*;

use crate::catalog::UpgradeCatalog;
use crate::config::LedgerConfig;
use crate::constants::LEVEL_FONT_SIZE;
use crate::plugin::{GrantSkillPoints, ResetUpgradesRequest, UpgradeDisplay, UpgradeRequest};

// ── Component markers ─────────────────────────────────────────────────────────

/// Which piece of [`UpgradeDisplay`] a text node shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayText {
    Value(usize),
    Level(usize),
    /// Caption of an item's UPGRADE button.
    UpgradeLabel(usize),
    SkillPoints,
    Error,
}

/// Filled part of an item's level bar.
#[derive(Component)]
pub struct ItemBarFill(pub usize);

/// Tags an item's UPGRADE button; holds the item index.
#[derive(Component)]
pub struct ItemUpgradeButton(pub usize);

/// Tags the RESET button.
#[derive(Component)]
pub struct ResetButton;

/// Error popup container; hidden while no error is shown.
#[derive(Component)]
pub struct ErrorPopupRoot;

/// Scale-in animation on a level text after a successful upgrade.
#[derive(Component, Debug, Clone, Copy)]
pub struct LevelPop {
    pub age: f32,
    pub duration: f32,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Spawns and drives the upgrade panel. Requires [`crate::plugin::UpgradeLedgerPlugin`].
pub struct UpgradeUiPlugin;

impl Plugin for UpgradeUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_upgrade_panel).add_systems(
            Update,
            (
                upgrade_button_system,
                button_hover_system,
                keyboard_system,
                sync_display_system,
                success_effect_system,
                level_pop_system,
            )
                .chain(),
        );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn panel_bg() -> Color {
    Color::srgb(0.05, 0.05, 0.08)
}
fn panel_border() -> Color {
    Color::srgb(0.30, 0.30, 0.46)
}
fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn points_color() -> Color {
    Color::srgb(0.25, 0.95, 0.50)
}
fn label_color() -> Color {
    Color::srgb(0.85, 0.85, 0.85)
}
fn value_color() -> Color {
    Color::srgb(0.55, 0.65, 0.60)
}
fn bar_bg() -> Color {
    Color::srgb(0.14, 0.14, 0.14)
}
fn bar_fill() -> Color {
    Color::srgb(0.18, 0.56, 0.18)
}
fn buy_bg() -> Color {
    Color::srgb(0.06, 0.22, 0.06)
}
fn buy_border() -> Color {
    Color::srgb(0.18, 0.56, 0.18)
}
fn buy_text() -> Color {
    Color::srgb(0.55, 1.0, 0.55)
}
fn reset_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn reset_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
fn reset_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}
fn error_bg() -> Color {
    Color::srgba(0.35, 0.05, 0.05, 0.92)
}
fn hint_color() -> Color {
    Color::srgb(0.28, 0.28, 0.35)
}
fn hover_bg() -> Color {
    Color::srgb(0.20, 0.20, 0.28)
}

// ── Startup: spawn UI ─────────────────────────────────────────────────────────

pub fn setup_upgrade_panel(mut commands: Commands, catalog: Res<UpgradeCatalog>) {
    commands.spawn(Camera2d);

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::BLACK),
        ))
        .with_children(|root| {
            root.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(32.0)),
                    row_gap: Val::Px(12.0),
                    border: UiRect::all(Val::Px(2.0)),
                    min_width: Val::Px(640.0),
                    ..default()
                },
                BackgroundColor(panel_bg()),
                BorderColor::all(panel_border()),
            ))
            .with_children(|card| {
                card.spawn((
                    Text::new("UPGRADES"),
                    TextFont {
                        font_size: 32.0,
                        ..default()
                    },
                    TextColor(title_color()),
                ));

                card.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(points_color()),
                    DisplayText::SkillPoints,
                ));

                for (index, def) in catalog.definitions().iter().enumerate() {
                    spawn_item_row(card, index, def.label());
                }

                spacer(card, 8.0);
                spawn_reset_button(card);

                // ── Error popup ───────────────────────────────────────────
                card.spawn((
                    Node {
                        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(error_bg()),
                    Visibility::Hidden,
                    ErrorPopupRoot,
                ))
                .with_children(|popup| {
                    popup.spawn((
                        Text::new(""),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        DisplayText::Error,
                    ));
                });

                card.spawn((
                    Text::new("P: +skill points  ·  ESC: quit"),
                    TextFont {
                        font_size: 12.0,
                        ..default()
                    },
                    TextColor(hint_color()),
                ));
            });
        });
}

fn spawn_item_row(parent: &mut ChildSpawnerCommands<'_>, index: usize, label: &str) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(14.0),
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Text::new(label.to_string()),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(label_color()),
                Node {
                    width: Val::Px(150.0),
                    ..default()
                },
            ));
            row.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(value_color()),
                Node {
                    width: Val::Px(110.0),
                    ..default()
                },
                DisplayText::Value(index),
            ));
            row.spawn((
                Text::new(""),
                TextFont {
                    font_size: LEVEL_FONT_SIZE,
                    ..default()
                },
                TextColor(label_color()),
                Node {
                    width: Val::Px(70.0),
                    ..default()
                },
                DisplayText::Level(index),
            ));

            // Level bar
            row.spawn((
                Node {
                    width: Val::Px(120.0),
                    height: Val::Px(10.0),
                    ..default()
                },
                BackgroundColor(bar_bg()),
            ))
            .with_children(|bar| {
                bar.spawn((
                    Node {
                        width: Val::Percent(0.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(bar_fill()),
                    ItemBarFill(index),
                ));
            });

            row.spawn((
                Button,
                Node {
                    width: Val::Px(110.0),
                    height: Val::Px(34.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(buy_bg()),
                BorderColor::all(buy_border()),
                ItemUpgradeButton(index),
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new(upgrade_label(false)),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(buy_text()),
                    DisplayText::UpgradeLabel(index),
                ));
            });
        });
}

fn spawn_reset_button(parent: &mut ChildSpawnerCommands<'_>) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(220.0),
                height: Val::Px(44.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(reset_bg()),
            BorderColor::all(reset_border()),
            ResetButton,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new("RESET"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(reset_text()),
            ));
        });
}

fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

// ── Update: input ─────────────────────────────────────────────────────────────

pub fn upgrade_button_system(
    upgrade_query: Query<(&Interaction, &ItemUpgradeButton), Changed<Interaction>>,
    reset_query: Query<&Interaction, (Changed<Interaction>, With<ResetButton>)>,
    mut upgrades: MessageWriter<UpgradeRequest>,
    mut resets: MessageWriter<ResetUpgradesRequest>,
) {
    for (interaction, button) in upgrade_query.iter() {
        if *interaction == Interaction::Pressed {
            upgrades.write(UpgradeRequest { index: button.0 });
        }
    }

    if reset_query.iter().any(|i| *i == Interaction::Pressed) {
        resets.write(ResetUpgradesRequest);
    }
}

/// Lighten buttons while hovered; restore their own colour otherwise.
#[allow(clippy::type_complexity)]
pub fn button_hover_system(
    mut query: Query<
        (&Interaction, &mut BackgroundColor, Has<ResetButton>),
        (Changed<Interaction>, With<Button>),
    >,
) {
    for (interaction, mut bg, is_reset) in query.iter_mut() {
        let rest = if is_reset { reset_bg() } else { buy_bg() };
        *bg = match interaction {
            Interaction::Hovered => BackgroundColor(hover_bg()),
            Interaction::Pressed | Interaction::None => BackgroundColor(rest),
        };
    }
}

pub fn keyboard_system(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<LedgerConfig>,
    mut grants: MessageWriter<GrantSkillPoints>,
    mut exit: MessageWriter<bevy::app::AppExit>,
) {
    if keys.just_pressed(KeyCode::KeyP) {
        grants.write(GrantSkillPoints {
            amount: config.grant_points_per_press,
        });
    }
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(bevy::app::AppExit::Success);
    }
}

// ── Update: display ───────────────────────────────────────────────────────────

/// Copy the display model into the panel when the coordinator changed it.
pub fn sync_display_system(
    display: Res<UpgradeDisplay>,
    catalog: Res<UpgradeCatalog>,
    mut texts: Query<(&DisplayText, &mut Text)>,
    mut bars: Query<(&ItemBarFill, &mut Node)>,
    mut popup: Query<&mut Visibility, With<ErrorPopupRoot>>,
) {
    if !display.is_changed() {
        return;
    }

    for (slot, mut text) in texts.iter_mut() {
        let wanted = match *slot {
            DisplayText::Value(i) => display.items.get(i).map(|item| item.value_text.as_str()),
            DisplayText::Level(i) => display.items.get(i).map(|item| item.level_text.as_str()),
            DisplayText::UpgradeLabel(i) => {
                display.items.get(i).map(|item| upgrade_label(item.maxed))
            }
            DisplayText::SkillPoints => Some(display.skill_points_text.as_str()),
            DisplayText::Error => display.error.as_ref().map(|e| e.message.as_str()),
        };
        if let Some(wanted) = wanted {
            if text.0 != wanted {
                text.0 = wanted.to_string();
            }
        }
    }

    for (fill, mut node) in bars.iter_mut() {
        let (Some(item), Some(def)) = (display.items.get(fill.0), catalog.get(fill.0)) else {
            continue;
        };
        node.width = Val::Percent(bar_percent(item.slider, def.max_level));
    }

    for mut visibility in popup.iter_mut() {
        *visibility = if display.error.is_some() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// Caption for an item's upgrade button. A maxed item still accepts presses
/// so the player sees why nothing happened.
pub fn upgrade_label(maxed: bool) -> &'static str {
    if maxed {
        "MAX"
    } else {
        "UPGRADE"
    }
}

/// Width of a level bar, in percent of its track.
pub fn bar_percent(level: f32, max_level: u32) -> f32 {
    if max_level == 0 {
        return 100.0;
    }
    (level / max_level as f32 * 100.0).clamp(0.0, 100.0)
}

/// Start a pop on the level text of every item that just upgraded.
pub fn success_effect_system(
    mut commands: Commands,
    config: Res<LedgerConfig>,
    mut display: ResMut<UpgradeDisplay>,
    texts: Query<(Entity, &DisplayText)>,
) {
    if display.pending_success.is_empty() {
        return;
    }
    for index in display.take_success() {
        for (entity, slot) in texts.iter() {
            if *slot == DisplayText::Level(index) {
                commands.entity(entity).insert(LevelPop {
                    age: 0.0,
                    duration: config.success_pop_secs,
                });
            }
        }
    }
}

pub fn level_pop_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut TextFont, &mut LevelPop)>,
) {
    for (entity, mut font, mut pop) in query.iter_mut() {
        pop.age += time.delta_secs();
        let t = if pop.duration > 0.0 {
            (pop.age / pop.duration).min(1.0)
        } else {
            1.0
        };
        // Text cannot be laid out at size zero.
        font.font_size = (LEVEL_FONT_SIZE * ease_out_back(t)).max(1.0);
        if t >= 1.0 {
            font.font_size = LEVEL_FONT_SIZE;
            commands.entity(entity).remove::<LevelPop>();
        }
    }
}

/// Ease-out with a short overshoot past 1.0 before settling.
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_back_hits_endpoints_and_overshoots() {
        assert!(ease_out_back(0.0).abs() < 1e-6);
        assert!((ease_out_back(1.0) - 1.0).abs() < 1e-6);
        let peak = (1..10)
            .map(|i| ease_out_back(i as f32 / 10.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn maxed_items_show_max_caption() {
        assert_eq!(upgrade_label(false), "UPGRADE");
        assert_eq!(upgrade_label(true), "MAX");
    }

    #[test]
    fn bar_percent_is_clamped() {
        assert_eq!(bar_percent(0.0, 10), 0.0);
        assert_eq!(bar_percent(5.0, 10), 50.0);
        assert_eq!(bar_percent(15.0, 10), 100.0);
        assert_eq!(bar_percent(0.0, 0), 100.0);
    }
}
