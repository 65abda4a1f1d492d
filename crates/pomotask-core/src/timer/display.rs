//! Text helpers for showing timer state.

use super::phase::{Phase, POMODOROS_PER_CYCLE};

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work Phase",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    /// Suggestions shown during a break. Empty for work.
    pub fn break_tips(self) -> &'static [&'static str] {
        match self {
            Phase::Work => &[],
            Phase::ShortBreak => &[
                "Stand up and stretch",
                "Rest your eyes by looking at something distant",
                "Take a few deep breaths",
                "Drink some water",
            ],
            Phase::LongBreak => &[
                "Step away from your computer completely",
                "Take a short walk outside if possible",
                "Do some light stretching or exercise",
                "Hydrate and have a healthy snack",
                "Practice deep breathing or meditation",
            ],
        }
    }
}

/// `MM:SS`. Minutes keep counting past 99.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Elapsed share of a phase, 0.0 ..= 100.0.
///
/// An extended break reports 0 until it is back inside its configured length.
pub fn progress_pct(seconds_remaining: u64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    let elapsed = total_secs.saturating_sub(seconds_remaining);
    (elapsed as f64 / total_secs as f64 * 100.0).clamp(0.0, 100.0)
}

/// 1-based position of the current work phase in its cycle, e.g. `(2, 4)`.
pub fn cycle_position(pomodoro_count: u32) -> (u32, u32) {
    (pomodoro_count % POMODOROS_PER_CYCLE + 1, POMODOROS_PER_CYCLE)
}
