//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not own a clock:
//! the caller invokes `tick()` once per elapsed second while the engine is
//! running (see [`TimerService`](super::TimerService)).
//!
//! ## Phase Transitions
//!
//! ```text
//! Work -(count % 4 != 0)-> ShortBreak -> Work
//! Work -(count % 4 == 0)-> LongBreak  -> Work
//! ```
//!
//! Commands queue [`Event`]s in an outbox; collect them with
//! [`TimerEngine::drain_events`].

use chrono::Utc;

use super::phase::{Durations, Phase};
use crate::events::Event;

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    durations: Durations,
    phase: Phase,
    seconds_remaining: u64,
    pomodoro_count: u32,
    running: bool,
    outbox: Vec<Event>,
}

impl TimerEngine {
    /// Create an idle engine at the start of a work phase.
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            seconds_remaining: durations.work_secs,
            pomodoro_count: 0,
            running: false,
            outbox: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn pomodoro_count(&self) -> u32 {
        self.pomodoro_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    /// Configured length of the current phase, without extensions.
    pub fn total_secs(&self) -> u64 {
        self.durations.for_phase(self.phase)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            total_secs: self.total_secs(),
            pomodoro_count: self.pomodoro_count,
            running: self.running,
            at: Utc::now(),
        }
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.outbox.push(Event::TimerStarted {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        });
    }

    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.outbox.push(Event::TimerPaused {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        });
    }

    /// Restore the current phase's full duration. Phase and count are kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.seconds_remaining = self.total_secs();
        self.outbox.push(Event::TimerReset {
            phase: self.phase,
            at: Utc::now(),
        });
        self.push_phase_changed();
    }

    /// Leave the current phase by hand. Counts a pomodoro when leaving work
    /// but does not report a completion.
    pub fn skip_to_next_phase(&mut self) {
        self.running = false;
        let from = self.phase;
        self.advance();
        self.outbox.push(Event::PhaseSkipped {
            from,
            to: self.phase,
            at: Utc::now(),
        });
        self.push_phase_changed();
    }

    /// Add time to a break. Ignored during work.
    pub fn extend_break(&mut self, extra_secs: u64) {
        if !self.phase.is_break() {
            return;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_add(extra_secs);
        self.outbox.push(Event::BreakExtended {
            phase: self.phase,
            extra_secs,
            at: Utc::now(),
        });
        self.push_phase_changed();
    }

    /// Swap in new durations.
    ///
    /// Future phases and resets use them. The current phase only picks up
    /// its new length when it is untouched: paused at its full old duration.
    pub fn set_durations(&mut self, durations: Durations) {
        if durations == self.durations {
            return;
        }
        let untouched = !self.running && self.seconds_remaining == self.total_secs();
        self.durations = durations;
        if untouched {
            self.seconds_remaining = self.total_secs();
        }
        self.push_phase_changed();
    }

    /// Advance the countdown by one second. Does nothing while paused.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        if self.seconds_remaining > 1 {
            self.seconds_remaining -= 1;
            self.push_phase_changed();
            return;
        }

        let ended = self.phase;
        self.seconds_remaining = 0;
        self.push_phase_changed();
        self.running = false;
        self.advance();
        self.outbox.push(Event::TimerCompleted {
            phase: ended,
            pomodoro_count: self.pomodoro_count,
            at: Utc::now(),
        });
        tracing::debug!(ended = %ended, next = %self.phase, count = self.pomodoro_count, "phase completed");
        self.push_phase_changed();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) {
        if self.phase == Phase::Work {
            self.pomodoro_count += 1;
        }
        self.phase = self.phase.successor(self.pomodoro_count);
        self.seconds_remaining = self.total_secs();
    }

    fn push_phase_changed(&mut self) {
        self.outbox.push(Event::PhaseChanged {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            total_secs: self.total_secs(),
            at: Utc::now(),
        });
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}
