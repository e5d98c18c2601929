use bevy::prelude::*;
use bevy::window::WindowResolution;

use upgrade_ledger::catalog::UpgradeCatalog;
use upgrade_ledger::config::{self, LedgerConfig};
use upgrade_ledger::constants::CONFIG_PATH;
use upgrade_ledger::plugin::{SkillLedger, UpgradeLedgerPlugin};
use upgrade_ledger::store::{MemoryStore, SharedStore, TomlFileStore};
use upgrade_ledger::ui::UpgradeUiPlugin;

/// Open the durable store, or fall back to memory so the panel still works
/// (progress is then lost on exit).
fn open_store(config: &LedgerConfig) -> SharedStore {
    match TomlFileStore::open(&config.save_path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            eprintln!("⚠ {err}; progress will not be saved this session");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config and definitions are needed to build the app, so they are read
    // before the log subscriber exists.
    let config = config::load_ledger_config(CONFIG_PATH);

    // A broken catalog would join levels to the wrong stats; refuse to start.
    let catalog = UpgradeCatalog::load(&config.catalog_path)?;
    println!(
        "✓ {} upgrades from {}",
        catalog.len(),
        config.catalog_path.display()
    );

    let ledger = SkillLedger::new(open_store(&config), config.starting_skill_points);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Upgrades".into(),
                resolution: WindowResolution::new(900, 600),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(config)
        .insert_resource(catalog)
        .insert_resource(ledger)
        .add_plugins((UpgradeLedgerPlugin, UpgradeUiPlugin))
        .run();

    Ok(())
}
