mod display;
mod engine;
mod phase;
mod service;

pub use display::{cycle_position, format_clock, progress_pct};
pub use engine::TimerEngine;
pub use phase::{Durations, Phase, POMODOROS_PER_CYCLE};
pub use service::{TimerCommand, TimerHandle, TimerService};
