//! Top-level wiring of stores, prioritizer, notifications and selection.
//!
//! The coordinator owns everything except the timer itself; the timer runs
//! in a [`TimerService`](crate::timer::TimerService) and reaches the
//! coordinator only through its events. Methods that need the timer to act
//! return a [`TimerCommand`] or new [`Durations`] for the caller to send.

use std::rc::Rc;

use serde::Serialize;

use crate::error::CoreError;
use crate::events::Event;
use crate::notify::{NotificationPresenter, Prompt, PromptAction, SoundPlayer};
use crate::settings::{Settings, SettingsStore};
use crate::storage::KeyValueStore;
use crate::task::{Prioritizer, Task, TaskStore};
use crate::timer::{cycle_position, format_clock, progress_pct, Durations, Phase, TimerCommand};

pub struct Coordinator {
    settings: SettingsStore,
    tasks: TaskStore,
    prioritizer: Prioritizer,
    presenter: NotificationPresenter,
    selected: Option<u64>,
}

impl Coordinator {
    /// Load settings and tasks from `kv`.
    pub fn load(kv: Rc<dyn KeyValueStore>, player: Box<dyn SoundPlayer>) -> Self {
        let settings = SettingsStore::load(kv.clone());
        let tasks = TaskStore::load(kv);
        let prioritizer = Prioritizer::new(tasks.tasks());
        let presenter = NotificationPresenter::new(&settings.settings(), player);
        Self {
            settings,
            tasks,
            prioritizer,
            presenter,
            selected: None,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.settings.settings()
    }

    pub fn durations(&self) -> Durations {
        self.settings.durations()
    }

    /// Save settings. On success returns the durations the timer should
    /// switch to; `None` when the settings were rejected.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be persisted.
    pub fn save_settings(&mut self, settings: Settings) -> Result<Option<Durations>, CoreError> {
        if !self.settings.save(settings)? {
            return Ok(None);
        }
        self.presenter.apply_settings(&settings);
        Ok(Some(settings.durations()))
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.completed_count()
    }

    /// # Errors
    /// Returns an error if the task list cannot be persisted.
    pub fn add_task(&mut self, text: &str) -> Result<Option<Task>, CoreError> {
        let task = self.tasks.add(text)?;
        if task.is_some() {
            self.tasks_changed();
        }
        Ok(task)
    }

    /// # Errors
    /// Returns an error if the task list cannot be persisted.
    pub fn update_task(&mut self, task: Task) -> Result<bool, CoreError> {
        let updated = self.tasks.update(task)?;
        if updated {
            self.tasks_changed();
        }
        Ok(updated)
    }

    /// # Errors
    /// Returns an error if the task list cannot be persisted.
    pub fn toggle_task(&mut self, id: u64) -> Result<Option<Task>, CoreError> {
        let task = self.tasks.toggle_complete(id)?;
        if task.is_some() {
            self.tasks_changed();
        }
        Ok(task)
    }

    /// # Errors
    /// Returns an error if the task list cannot be persisted.
    pub fn edit_task(&mut self, id: u64, text: &str) -> Result<Option<Task>, CoreError> {
        let task = self.tasks.edit_text(id, text)?;
        if task.is_some() {
            self.tasks_changed();
        }
        Ok(task)
    }

    /// Delete a task, clearing the selection if it pointed at it.
    ///
    /// # Errors
    /// Returns an error if the task list cannot be persisted.
    pub fn delete_task(&mut self, id: u64) -> Result<bool, CoreError> {
        let deleted = self.tasks.delete(id)?;
        if deleted {
            if self.selected == Some(id) {
                self.selected = None;
            }
            self.tasks_changed();
        }
        Ok(deleted)
    }

    fn tasks_changed(&mut self) {
        self.prioritizer.sync(self.tasks.tasks());
    }

    // ── Priority & selection ─────────────────────────────────────────

    pub fn priority_queue(&self) -> &[Task] {
        self.prioritizer.tasks()
    }

    pub fn next_index(&self) -> usize {
        self.prioritizer.next_index()
    }

    pub fn move_up(&mut self, index: usize) {
        self.prioritizer.move_up(index);
    }

    pub fn move_down(&mut self, index: usize) {
        self.prioritizer.move_down(index);
    }

    /// Select the prioritizer's next task. Keeps the current selection when
    /// the queue is empty.
    pub fn select_next_task(&mut self) -> Option<&Task> {
        if let Some(next) = self.prioritizer.select_next() {
            self.selected = Some(next.id);
        }
        self.selected_task()
    }

    /// Live record of the selected task.
    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|id| self.tasks.get(id))
    }

    // ── Timer events & prompts ───────────────────────────────────────

    /// Feed a timer event. Returns the prompt to show, if any.
    pub fn handle_event(&mut self, event: &Event) -> Option<Prompt> {
        match event {
            Event::TimerCompleted {
                phase,
                pomodoro_count,
                ..
            } => {
                let next = phase.successor(*pomodoro_count);
                self.presenter.on_timer_complete(*phase, next)
            }
            _ => None,
        }
    }

    pub fn open_prompt(&self) -> Option<Prompt> {
        self.presenter.open_prompt()
    }

    /// Answer the open prompt.
    pub fn resolve_prompt(&mut self, action: PromptAction) -> Option<TimerCommand> {
        self.presenter.resolve(action)
    }

    /// Combine a timer snapshot with the selected task for display.
    /// Returns `None` for anything but [`Event::StateSnapshot`].
    pub fn focus_view(&self, snapshot: &Event) -> Option<FocusView> {
        let Event::StateSnapshot {
            phase,
            seconds_remaining,
            total_secs,
            pomodoro_count,
            running,
            ..
        } = snapshot
        else {
            return None;
        };
        let (cycle_index, cycle_length) = cycle_position(*pomodoro_count);
        Some(FocusView {
            phase: *phase,
            label: phase.label(),
            clock: format_clock(*seconds_remaining),
            seconds_remaining: *seconds_remaining,
            total_secs: *total_secs,
            progress_pct: progress_pct(*seconds_remaining, *total_secs),
            pomodoro_count: *pomodoro_count,
            cycle_index,
            cycle_length,
            running: *running,
            task: self.selected_task().map(|t| t.text.clone()),
        })
    }
}

/// Everything the front end shows about the current phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusView {
    pub phase: Phase,
    pub label: &'static str,
    pub clock: String,
    pub seconds_remaining: u64,
    pub total_secs: u64,
    pub progress_pct: f64,
    pub pomodoro_count: u32,
    pub cycle_index: u32,
    pub cycle_length: u32,
    pub running: bool,
    pub task: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::SilentPlayer;
    use crate::storage::MemoryStore;
    use crate::timer::TimerEngine;
    use chrono::Utc;

    fn coordinator() -> (Rc<dyn KeyValueStore>, Coordinator) {
        let kv: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let c = Coordinator::load(kv.clone(), Box::new(SilentPlayer));
        (kv, c)
    }

    #[test]
    fn selection_tracks_the_next_task() {
        let (_, mut c) = coordinator();
        assert!(c.selected_task().is_none());
        c.move_down(0);
        let selected = c.select_next_task().unwrap();
        assert_eq!(selected.text, "Design user interface");
    }

    #[test]
    fn deleting_the_selected_task_clears_selection() {
        let (_, mut c) = coordinator();
        let id = c.select_next_task().unwrap().id;
        assert!(c.delete_task(id).unwrap());
        assert!(c.selected_task().is_none());
        assert_eq!(c.priority_queue().len(), 2);
    }

    #[test]
    fn deleting_another_task_keeps_selection() {
        let (_, mut c) = coordinator();
        let id = c.select_next_task().unwrap().id;
        c.delete_task(4).unwrap();
        assert_eq!(c.selected_task().unwrap().id, id);
    }

    #[test]
    fn selected_task_reflects_edits() {
        let (_, mut c) = coordinator();
        let id = c.select_next_task().unwrap().id;
        c.edit_task(id, "Design the dashboard").unwrap();
        assert_eq!(c.selected_task().unwrap().text, "Design the dashboard");
    }

    #[test]
    fn task_changes_rebuild_the_queue() {
        let (_, mut c) = coordinator();
        c.move_down(0);
        assert_eq!(c.next_index(), 1);

        let task = c.add_task("Buy milk").unwrap().unwrap();
        assert_eq!(c.next_index(), 0);
        assert_eq!(c.priority_queue().last().unwrap().id, task.id);

        c.toggle_task(task.id).unwrap();
        assert!(c.priority_queue().iter().all(|t| t.id != task.id));
        assert_eq!(c.completed_count(), 2);
    }

    #[test]
    fn save_settings_returns_new_durations() {
        let (kv, mut c) = coordinator();
        let settings = Settings {
            work_minutes: 20,
            ..Settings::default()
        };
        let durations = c.save_settings(settings).unwrap().unwrap();
        assert_eq!(durations.work_secs, 20 * 60);

        let rejected = Settings {
            long_break_minutes: 45,
            ..Settings::default()
        };
        assert!(c.save_settings(rejected).unwrap().is_none());
        assert_eq!(c.settings().work_minutes, 20);

        let reloaded = Coordinator::load(kv, Box::new(SilentPlayer));
        assert_eq!(reloaded.settings().work_minutes, 20);
    }

    #[test]
    fn completion_events_open_prompts() {
        let (_, mut c) = coordinator();
        let work_done = Event::TimerCompleted {
            phase: Phase::Work,
            pomodoro_count: 4,
            at: Utc::now(),
        };
        assert_eq!(
            c.handle_event(&work_done),
            Some(Prompt::BreakDecision { next: Phase::LongBreak })
        );
        assert_eq!(c.resolve_prompt(PromptAction::SkipBreak), Some(TimerCommand::Skip));

        let break_done = Event::TimerCompleted {
            phase: Phase::ShortBreak,
            pomodoro_count: 1,
            at: Utc::now(),
        };
        assert_eq!(c.handle_event(&break_done), None);

        c.save_settings(Settings {
            auto_start_breaks: false,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(c.handle_event(&break_done), Some(Prompt::ContinueToWork));
    }

    #[test]
    fn other_events_are_ignored() {
        let (_, mut c) = coordinator();
        let engine = TimerEngine::default();
        assert_eq!(c.handle_event(&engine.snapshot()), None);
    }

    #[test]
    fn focus_view_combines_timer_and_task() {
        let (_, mut c) = coordinator();
        c.select_next_task();
        let mut engine = TimerEngine::default();
        engine.skip_to_next_phase();
        let view = c.focus_view(&engine.snapshot()).unwrap();
        assert_eq!(view.label, "Short Break");
        assert_eq!(view.clock, "05:00");
        assert_eq!(view.cycle_index, 2);
        assert_eq!(view.task.as_deref(), Some("Design user interface"));

        let not_a_snapshot = Event::TimerReset {
            phase: Phase::Work,
            at: Utc::now(),
        };
        assert!(c.focus_view(&not_a_snapshot).is_none());
    }
}
