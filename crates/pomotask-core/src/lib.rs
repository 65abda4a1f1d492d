//! # Pomotask Core Library
//!
//! Business logic of the Pomotask Pomodoro timer: the phase state machine,
//! the task list with its priority queue, user settings and completion
//! notifications. The `pomotask` CLI is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven state machine ([`TimerEngine`]) run by a tokio
//!   task ([`TimerService`]) that owns the one-second interval
//! - **Stores**: [`TaskStore`] and [`SettingsStore`] persisting JSON blobs in
//!   a [`KeyValueStore`] (in memory or SQLite)
//! - **Coordinator**: wires stores, the priority queue, the selected task and
//!   completion prompts together
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerHandle`]: Controls for a running timer
//! - [`Coordinator`]: Everything around the timer
//! - [`Config`]: Application configuration management

pub mod coordinator;
pub mod error;
pub mod events;
pub mod notify;
pub mod settings;
pub mod storage;
pub mod task;
pub mod timer;

pub use coordinator::{Coordinator, FocusView};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{
    CommandPlayer, NotificationPresenter, Prompt, PromptAction, SilentPlayer, SoundPlayer,
    TerminalBell,
};
pub use settings::{Settings, SettingsStore};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use task::{Prioritizer, Task, TaskStore};
pub use timer::{Durations, Phase, TimerCommand, TimerEngine, TimerHandle, TimerService};
