use serde::{Deserialize, Serialize};

/// Completed work phases per long-break cycle.
pub const POMODOROS_PER_CYCLE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    /// The phase entered when this one ends, given the pomodoro count
    /// *after* any increment for a finished work phase.
    pub fn successor(self, pomodoro_count: u32) -> Phase {
        match self {
            Phase::Work if pomodoro_count % POMODOROS_PER_CYCLE == 0 => Phase::LongBreak,
            Phase::Work => Phase::ShortBreak,
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Work => "work",
            Phase::ShortBreak => "shortBreak",
            Phase::LongBreak => "longBreak",
        };
        f.write_str(s)
    }
}

/// Phase lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl Durations {
    pub fn from_minutes(work: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            work_secs: u64::from(work) * 60,
            short_break_secs: u64::from(short_break) * 60,
            long_break_secs: u64::from(long_break) * 60,
        }
    }

    pub fn for_phase(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for Durations {
    /// 25 / 5 / 20 minutes.
    fn default() -> Self {
        Self::from_minutes(25, 5, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fourth_pomodoro_earns_a_long_break() {
        assert_eq!(Phase::Work.successor(1), Phase::ShortBreak);
        assert_eq!(Phase::Work.successor(3), Phase::ShortBreak);
        assert_eq!(Phase::Work.successor(4), Phase::LongBreak);
        assert_eq!(Phase::Work.successor(8), Phase::LongBreak);
        assert_eq!(Phase::ShortBreak.successor(4), Phase::Work);
        assert_eq!(Phase::LongBreak.successor(1), Phase::Work);
    }

    #[test]
    fn phase_serializes_camel_case() {
        assert_eq!(serde_json::to_string(&Phase::ShortBreak).unwrap(), "\"shortBreak\"");
        assert_eq!(Phase::LongBreak.to_string(), "longBreak");
    }
}
