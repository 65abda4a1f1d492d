//! User timer settings and their store.
//!
//! Stored under [`SETTINGS_KEY`] as
//! `{"work":25,"shortBreak":5,"longBreak":20,"sound":true,"autoStart":true}`
//! with durations in whole minutes.

use std::ops::RangeInclusive;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::storage::{KeyValueStore, SETTINGS_KEY};
use crate::timer::Durations;

pub const WORK_MINUTES: RangeInclusive<u32> = 1..=60;
pub const SHORT_BREAK_MINUTES: RangeInclusive<u32> = 1..=15;
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 5..=30;

/// Timer durations and notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "work")]
    pub work_minutes: u32,
    #[serde(rename = "shortBreak")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreak")]
    pub long_break_minutes: u32,
    #[serde(rename = "sound")]
    pub sound_enabled: bool,
    #[serde(rename = "autoStart")]
    pub auto_start_breaks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 20,
            sound_enabled: true,
            auto_start_breaks: true,
        }
    }
}

impl Settings {
    /// Check every duration against its accepted range.
    ///
    /// # Errors
    /// Returns the first duration outside its range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("work", self.work_minutes, WORK_MINUTES)?;
        check_range("shortBreak", self.short_break_minutes, SHORT_BREAK_MINUTES)?;
        check_range("longBreak", self.long_break_minutes, LONG_BREAK_MINUTES)?;
        Ok(())
    }

    pub fn durations(&self) -> Durations {
        Durations::from_minutes(
            self.work_minutes,
            self.short_break_minutes,
            self.long_break_minutes,
        )
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Owner of the persisted [`Settings`].
pub struct SettingsStore {
    kv: Rc<dyn KeyValueStore>,
    settings: Settings,
}

impl SettingsStore {
    /// Read settings from the store.
    ///
    /// Missing, unreadable or out-of-range data yields the defaults.
    pub fn load(kv: Rc<dyn KeyValueStore>) -> Self {
        let settings = match kv.get(SETTINGS_KEY) {
            Ok(Some(json)) => parse_settings(&json),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read settings, using defaults");
                Settings::default()
            }
        };
        Self { kv, settings }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn durations(&self) -> Durations {
        self.settings.durations()
    }

    /// Validate and persist `settings`.
    ///
    /// Returns `Ok(false)` without touching anything when a duration is out
    /// of range.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be written.
    pub fn save(&mut self, settings: Settings) -> Result<bool, CoreError> {
        if let Err(e) = settings.validate() {
            tracing::debug!(error = %e, "rejected settings");
            return Ok(false);
        }
        let json = serde_json::to_string(&settings)?;
        self.kv.set(SETTINGS_KEY, &json)?;
        self.settings = settings;
        Ok(true)
    }

    /// Drop persisted settings and return to the defaults.
    ///
    /// # Errors
    /// Returns an error if the stored entry cannot be removed.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        self.kv.remove(SETTINGS_KEY)?;
        self.settings = Settings::default();
        Ok(())
    }
}

fn parse_settings(json: &str) -> Settings {
    match serde_json::from_str::<Settings>(json) {
        Ok(settings) => match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "stored settings out of range, using defaults");
                Settings::default()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "malformed stored settings, using defaults");
            Settings::default()
        }
    }
}
