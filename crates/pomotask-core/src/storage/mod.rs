mod config;
pub mod database;
mod memory;

pub use config::{Config, LoggingConfig, SoundConfig, StorageConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "pomodoro-tasks";
/// Key holding the JSON settings object.
pub const SETTINGS_KEY: &str = "pomodoro-settings";

/// Opaque string key-value store the task and settings stores persist into.
///
/// Methods take `&self`; implementations use interior mutability so one
/// store can be shared by several owners.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTASK_DATA_DIR` wins when set. Otherwise `~/.config/pomotask[-dev]/`
/// based on `POMOTASK_ENV` (set `POMOTASK_ENV=dev` for a development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("POMOTASK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTASK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotask-dev")
            } else {
                base_dir.join("pomotask")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
