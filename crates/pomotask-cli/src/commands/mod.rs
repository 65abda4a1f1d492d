pub mod config;
pub mod run;
pub mod settings;
pub mod task;

use std::rc::Rc;

use pomotask_core::{CommandPlayer, Config, Database, KeyValueStore, SoundPlayer, TerminalBell};

/// Open the SQLite store named by the config.
pub fn open_store(config: &Config) -> Result<Rc<dyn KeyValueStore>, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    Ok(Rc::new(Database::open_at(&path)?))
}

/// Sound backend named by the config.
pub fn sound_player(config: &Config) -> Box<dyn SoundPlayer> {
    match config.sound.command.as_deref() {
        Some(command) if !command.trim().is_empty() => Box::new(CommandPlayer::new(command)),
        _ => Box::new(TerminalBell),
    }
}
