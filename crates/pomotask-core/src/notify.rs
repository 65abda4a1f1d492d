//! Completion notifications.
//!
//! When a phase runs out the presenter plays the cue (if enabled) and
//! decides whether the user has to answer a prompt:
//!
//! | ended phase | auto-start breaks | prompt            |
//! |-------------|-------------------|-------------------|
//! | work        | any               | `BreakDecision`   |
//! | break       | off               | `ContinueToWork`  |
//! | break       | on                | none              |

use std::io::Write;
use std::process::{Command, Stdio};

use crate::settings::Settings;
use crate::timer::{Phase, TimerCommand};

/// Failure of a sound backend. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("failed to write bell: {0}")]
    Bell(#[source] std::io::Error),
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sound command is empty")]
    EmptyCommand,
}

/// Fire-and-forget audio cue.
pub trait SoundPlayer {
    fn play(&mut self) -> Result<(), SoundError>;
}

/// Plays nothing.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&mut self) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl SoundPlayer for TerminalBell {
    fn play(&mut self) -> Result<(), SoundError> {
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07").map_err(SoundError::Bell)?;
        stderr.flush().map_err(SoundError::Bell)
    }
}

/// Spawns an external player, e.g. `paplay /usr/share/sounds/bell.oga`.
/// The child is reaped on a detached thread; `play` never blocks on it.
#[derive(Debug)]
pub struct CommandPlayer {
    command_line: String,
}

impl CommandPlayer {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
        }
    }
}

impl SoundPlayer for CommandPlayer {
    fn play(&mut self) -> Result<(), SoundError> {
        let mut parts = self.command_line.split_whitespace();
        let program = parts.next().ok_or(SoundError::EmptyCommand)?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SoundError::Spawn {
                command: self.command_line.clone(),
                source,
            })?;
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!(error = %e, "sound command was not reaped");
            }
        });
        Ok(())
    }
}

/// Decision point shown after a phase ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Work ended; `next` is the break the timer moved to.
    BreakDecision { next: Phase },
    /// A break ended and breaks are not auto-started.
    ContinueToWork,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::BreakDecision { .. } => "Pomodoro Complete!",
            Prompt::ContinueToWork => "Break Over",
        }
    }

    pub fn message(&self, settings: &Settings) -> String {
        match self {
            Prompt::BreakDecision { next: Phase::LongBreak } => format!(
                "Great job completing 4 Pomodoro sessions! Take a well-deserved {}-minute break.",
                settings.long_break_minutes
            ),
            Prompt::BreakDecision { .. } => format!(
                "You've completed a Pomodoro session! Time for a short {}-minute break.",
                settings.short_break_minutes
            ),
            Prompt::ContinueToWork => {
                "Your break is over. Ready to focus on your next task?".to_string()
            }
        }
    }

    pub fn actions(&self) -> &'static [PromptAction] {
        match self {
            Prompt::BreakDecision { .. } => &[PromptAction::StartBreak, PromptAction::SkipBreak],
            Prompt::ContinueToWork => &[PromptAction::ContinueWork],
        }
    }
}

/// User's answer to a [`Prompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    StartBreak,
    SkipBreak,
    ContinueWork,
    /// Close button or escape. Leaves the timer alone.
    Dismiss,
}

/// Reacts to completions with a sound and, when needed, a prompt.
pub struct NotificationPresenter {
    sound_enabled: bool,
    auto_start_breaks: bool,
    player: Box<dyn SoundPlayer>,
    open: Option<Prompt>,
}

impl NotificationPresenter {
    pub fn new(settings: &Settings, player: Box<dyn SoundPlayer>) -> Self {
        Self {
            sound_enabled: settings.sound_enabled,
            auto_start_breaks: settings.auto_start_breaks,
            player,
            open: None,
        }
    }

    /// Pick up new preferences.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sound_enabled = settings.sound_enabled;
        self.auto_start_breaks = settings.auto_start_breaks;
    }

    pub fn open_prompt(&self) -> Option<Prompt> {
        self.open
    }

    /// Handle the natural end of `ended`. `next` is the phase the timer moved to.
    pub fn on_timer_complete(&mut self, ended: Phase, next: Phase) -> Option<Prompt> {
        if self.sound_enabled {
            if let Err(e) = self.player.play() {
                tracing::warn!(error = %e, "could not play notification sound");
            }
        }

        let prompt = match ended {
            Phase::Work => Some(Prompt::BreakDecision { next }),
            Phase::ShortBreak | Phase::LongBreak if self.auto_start_breaks => None,
            Phase::ShortBreak | Phase::LongBreak => Some(Prompt::ContinueToWork),
        };
        self.open = prompt;
        prompt
    }

    /// Close the open prompt and turn the answer into a timer command.
    ///
    /// Without an open prompt, or for an action the prompt does not offer,
    /// nothing happens.
    pub fn resolve(&mut self, action: PromptAction) -> Option<TimerCommand> {
        let prompt = self.open?;
        if action == PromptAction::Dismiss {
            self.open = None;
            return None;
        }
        if !prompt.actions().contains(&action) {
            return None;
        }
        self.open = None;
        match action {
            PromptAction::StartBreak | PromptAction::ContinueWork => Some(TimerCommand::Start),
            PromptAction::SkipBreak => Some(TimerCommand::Skip),
            PromptAction::Dismiss => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingPlayer {
        plays: Rc<Cell<u32>>,
        fail: bool,
    }

    impl SoundPlayer for CountingPlayer {
        fn play(&mut self) -> Result<(), SoundError> {
            self.plays.set(self.plays.get() + 1);
            if self.fail {
                Err(SoundError::EmptyCommand)
            } else {
                Ok(())
            }
        }
    }

    fn presenter(settings: Settings, fail: bool) -> (NotificationPresenter, Rc<Cell<u32>>) {
        let plays = Rc::new(Cell::new(0));
        let player = CountingPlayer {
            plays: plays.clone(),
            fail,
        };
        (NotificationPresenter::new(&settings, Box::new(player)), plays)
    }

    #[test]
    fn work_completion_offers_a_break() {
        let (mut p, plays) = presenter(Settings::default(), false);
        let prompt = p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(prompt, Some(Prompt::BreakDecision { next: Phase::ShortBreak }));
        assert_eq!(p.open_prompt(), prompt);
        assert_eq!(plays.get(), 1);
    }

    #[test]
    fn break_completion_respects_auto_start() {
        let (mut p, _) = presenter(Settings::default(), false);
        assert_eq!(p.on_timer_complete(Phase::ShortBreak, Phase::Work), None);
        assert_eq!(p.open_prompt(), None);

        p.apply_settings(&Settings {
            auto_start_breaks: false,
            ..Settings::default()
        });
        assert_eq!(
            p.on_timer_complete(Phase::LongBreak, Phase::Work),
            Some(Prompt::ContinueToWork)
        );
    }

    #[test]
    fn sound_follows_preference_and_failures_are_swallowed() {
        let (mut p, plays) = presenter(
            Settings {
                sound_enabled: false,
                ..Settings::default()
            },
            true,
        );
        p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(plays.get(), 0);

        p.apply_settings(&Settings::default());
        let prompt = p.on_timer_complete(Phase::Work, Phase::LongBreak);
        assert_eq!(plays.get(), 1);
        assert_eq!(prompt, Some(Prompt::BreakDecision { next: Phase::LongBreak }));
    }

    #[test]
    fn answers_map_to_timer_commands() {
        let (mut p, _) = presenter(Settings::default(), false);
        p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(p.resolve(PromptAction::SkipBreak), Some(TimerCommand::Skip));
        assert_eq!(p.open_prompt(), None);

        p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(p.resolve(PromptAction::StartBreak), Some(TimerCommand::Start));

        p.apply_settings(&Settings {
            auto_start_breaks: false,
            ..Settings::default()
        });
        p.on_timer_complete(Phase::ShortBreak, Phase::Work);
        assert_eq!(p.resolve(PromptAction::ContinueWork), Some(TimerCommand::Start));
    }

    #[test]
    fn dismiss_closes_without_a_command() {
        let (mut p, _) = presenter(Settings::default(), false);
        p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(p.resolve(PromptAction::Dismiss), None);
        assert_eq!(p.open_prompt(), None);
    }

    #[test]
    fn answers_without_a_matching_prompt_do_nothing() {
        let (mut p, _) = presenter(Settings::default(), false);
        assert_eq!(p.resolve(PromptAction::SkipBreak), None);

        p.on_timer_complete(Phase::Work, Phase::ShortBreak);
        assert_eq!(p.resolve(PromptAction::ContinueWork), None);
        assert!(p.open_prompt().is_some());
    }

    #[test]
    fn messages_name_the_break_length() {
        let settings = Settings::default();
        let short = Prompt::BreakDecision { next: Phase::ShortBreak };
        let long = Prompt::BreakDecision { next: Phase::LongBreak };
        assert!(short.message(&settings).contains("5-minute"));
        assert!(long.message(&settings).contains("20-minute"));
        assert_eq!(Prompt::ContinueToWork.title(), "Break Over");
    }

    #[test]
    fn empty_sound_command_is_an_error() {
        assert!(matches!(
            CommandPlayer::new("  ").play(),
            Err(SoundError::EmptyCommand)
        ));
    }

    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        std::fs::read_dir("/proc")
            .unwrap()
            .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path().join("stat")).ok())
            .filter(|stat| {
                // "<pid> (<comm>) <state> <ppid> ..."; comm may contain spaces.
                let Some((_, rest)) = stat.rsplit_once(") ") else {
                    return false;
                };
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn finished_sound_commands_are_reaped() {
        let mut player = CommandPlayer::new("true");
        for _ in 0..5 {
            player.play().unwrap();
        }
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while zombie_children() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        assert_eq!(zombie_children(), 0);
    }
}
