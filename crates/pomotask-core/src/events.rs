use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every timer state change produces an Event.
/// The front end and the notification presenter consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        at: DateTime<Utc>,
    },
    /// Manual advance; never accompanied by `TimerCompleted`.
    PhaseSkipped {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    BreakExtended {
        phase: Phase,
        extra_secs: u64,
        at: DateTime<Utc>,
    },
    /// Phase, remaining time or durations changed.
    PhaseChanged {
        phase: Phase,
        seconds_remaining: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// Natural expiry of `phase`.
    TimerCompleted {
        phase: Phase,
        pomodoro_count: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        seconds_remaining: u64,
        total_secs: u64,
        pomodoro_count: u32,
        running: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::PhaseSkipped { at, .. }
            | Event::BreakExtended { at, .. }
            | Event::PhaseChanged { at, .. }
            | Event::TimerCompleted { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
