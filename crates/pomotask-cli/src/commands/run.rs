//! Interactive timer session.
//!
//! Reads one command per line from stdin while the timer service ticks in
//! the background. Timer events are printed as they arrive.

use std::io::Write;

use chrono::Local;
use pomotask_core::timer::format_clock;
use pomotask_core::{
    Config, Coordinator, Event, Prompt, PromptAction, Settings, TimerCommand, TimerEngine,
    TimerHandle, TimerService,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::settings::print_settings;
use super::task::print_tasks;

const HELP: &str = "\
Timer:    start | pause | reset | skip | extend [min] | status
Tasks:    tasks | add <text> | done <id> | edit <id> <text> | rm <id>
Priority: queue | up <n> | down <n> | next
Prompts:  break | skip-break | work | dismiss
Settings: settings | set <work|short|long> <min> | set <sound|autostart> <on|off>
Other:    help | quit";

/// A single settings edit made from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    Work(u32),
    ShortBreak(u32),
    LongBreak(u32),
    Sound(bool),
    AutoStart(bool),
}

impl SettingChange {
    fn parse(rest: &str) -> Result<Self, String> {
        let usage = "usage: set <work|short|long> <min> | set <sound|autostart> <on|off>";
        let (key, value) = rest.split_once(char::is_whitespace).ok_or(usage)?;
        let minutes = || -> Result<u32, String> {
            value
                .trim()
                .parse()
                .map_err(|_| format!("expected minutes, got '{}'", value.trim()))
        };
        let flag = || match value.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => Ok(true),
            "off" | "false" | "no" => Ok(false),
            other => Err(format!("expected on or off, got '{other}'")),
        };
        match key.to_ascii_lowercase().as_str() {
            "work" => Ok(SettingChange::Work(minutes()?)),
            "short" => Ok(SettingChange::ShortBreak(minutes()?)),
            "long" => Ok(SettingChange::LongBreak(minutes()?)),
            "sound" => Ok(SettingChange::Sound(flag()?)),
            "autostart" => Ok(SettingChange::AutoStart(flag()?)),
            _ => Err(usage.to_string()),
        }
    }

    fn apply(self, settings: &mut Settings) {
        match self {
            SettingChange::Work(m) => settings.work_minutes = m,
            SettingChange::ShortBreak(m) => settings.short_break_minutes = m,
            SettingChange::LongBreak(m) => settings.long_break_minutes = m,
            SettingChange::Sound(on) => settings.sound_enabled = on,
            SettingChange::AutoStart(on) => settings.auto_start_breaks = on,
        }
    }
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Timer(TimerCommand),
    /// Extend the break by this many minutes, or the configured default.
    Extend(Option<u64>),
    Status,
    Tasks,
    Add(String),
    Toggle(u64),
    Edit(u64, String),
    Remove(u64),
    Queue,
    /// 0-based queue position.
    MoveUp(usize),
    /// 0-based queue position.
    MoveDown(usize),
    SelectNext,
    Answer(PromptAction),
    Settings,
    Set(SettingChange),
    Help,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "" | "status" | "s" => ReplCommand::Status,
            "start" => ReplCommand::Timer(TimerCommand::Start),
            "pause" | "p" => ReplCommand::Timer(TimerCommand::Pause),
            "reset" => ReplCommand::Timer(TimerCommand::Reset),
            "skip" => ReplCommand::Timer(TimerCommand::Skip),
            "extend" if rest.is_empty() => ReplCommand::Extend(None),
            "extend" => ReplCommand::Extend(Some(number(rest)?)),
            "tasks" | "ls" => ReplCommand::Tasks,
            "add" if rest.is_empty() => return Err("usage: add <text>".into()),
            "add" => ReplCommand::Add(rest.to_string()),
            "done" => ReplCommand::Toggle(number(rest)?),
            "edit" => {
                let (id, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: edit <id> <text>")?;
                ReplCommand::Edit(number(id)?, text.trim().to_string())
            }
            "rm" | "delete" => ReplCommand::Remove(number(rest)?),
            "queue" | "q" => ReplCommand::Queue,
            "up" => ReplCommand::MoveUp(position(rest)?),
            "down" => ReplCommand::MoveDown(position(rest)?),
            "next" => ReplCommand::SelectNext,
            "break" => ReplCommand::Answer(PromptAction::StartBreak),
            "skip-break" => ReplCommand::Answer(PromptAction::SkipBreak),
            "work" => ReplCommand::Answer(PromptAction::ContinueWork),
            "dismiss" | "esc" => ReplCommand::Answer(PromptAction::Dismiss),
            "settings" => ReplCommand::Settings,
            "set" => ReplCommand::Set(SettingChange::parse(rest)?),
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" => ReplCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

fn number(s: &str) -> Result<u64, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("expected a number, got '{s}'"))
}

/// 1-based on screen, 0-based inside.
fn position(s: &str) -> Result<usize, String> {
    match number(s)? {
        0 => Err("positions start at 1".into()),
        n => usize::try_from(n - 1).map_err(|_| format!("position out of range: {n}")),
    }
}

pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let kv = super::open_store(config)?;
    let mut coordinator = Coordinator::load(kv, super::sound_player(config));
    let handle = TimerService::spawn(TimerEngine::new(coordinator.durations()));
    let mut events = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let default_extension = config.break_extension_secs();

    println!("{HELP}");
    print_status(&coordinator, &handle.snapshot().await?);

    loop {
        // Events go first so output lands before the next command runs.
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Ok(event) => on_event(&mut coordinator, &event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "display fell behind timer events");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ReplCommand::parse(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => {
                        execute(command, &mut coordinator, &handle, default_extension).await?;
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

async fn execute(
    command: ReplCommand,
    coordinator: &mut Coordinator,
    handle: &TimerHandle,
    default_extension: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ReplCommand::Timer(command) => {
            handle.command(command).await?;
        }
        ReplCommand::Extend(minutes) => {
            let secs = minutes.map_or(default_extension, |m| m.saturating_mul(60));
            handle.extend_break(secs).await?;
        }
        ReplCommand::Status => print_status(coordinator, &handle.snapshot().await?),
        ReplCommand::Tasks => show_tasks(coordinator),
        ReplCommand::Add(text) => match coordinator.add_task(&text)? {
            Some(task) => println!("Task added: {} {}", task.id, task.text),
            None => println!("task text must not be empty"),
        },
        ReplCommand::Toggle(id) => match coordinator.toggle_task(id)? {
            Some(task) if task.completed => println!("Completed: {}", task.text),
            Some(task) => println!("Reopened: {}", task.text),
            None => println!("Task not found: {id}"),
        },
        ReplCommand::Edit(id, text) => match coordinator.edit_task(id, &text)? {
            Some(task) => println!("Task updated: {} {}", task.id, task.text),
            None => println!("nothing changed"),
        },
        ReplCommand::Remove(id) => {
            if coordinator.delete_task(id)? {
                println!("Task deleted: {id}");
            } else {
                println!("Task not found: {id}");
            }
        }
        ReplCommand::Queue => show_queue(coordinator),
        ReplCommand::MoveUp(index) => {
            coordinator.move_up(index);
            show_queue(coordinator);
        }
        ReplCommand::MoveDown(index) => {
            coordinator.move_down(index);
            show_queue(coordinator);
        }
        ReplCommand::SelectNext => match coordinator.select_next_task() {
            Some(task) => println!("Current focus: {}", task.text),
            None => println!("No task selected. Add a task first."),
        },
        ReplCommand::Answer(action) => {
            if coordinator.open_prompt().is_none() {
                println!("nothing to answer");
            } else if let Some(command) = coordinator.resolve_prompt(action) {
                handle.command(command).await?;
            } else if let Some(prompt) = coordinator.open_prompt() {
                println!("not an answer to this prompt. Choose: {}", choices(prompt));
            }
        }
        ReplCommand::Settings => print_settings(&coordinator.settings()),
        ReplCommand::Set(change) => {
            let mut settings = coordinator.settings();
            change.apply(&mut settings);
            if let Err(e) = settings.validate() {
                println!("{e}");
                return Ok(());
            }
            if let Some(durations) = coordinator.save_settings(settings)? {
                handle.set_durations(durations).await?;
                println!("settings saved");
            }
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn on_event(coordinator: &mut Coordinator, event: &Event) {
    match event {
        Event::PhaseChanged {
            phase,
            seconds_remaining,
            ..
        } => {
            print!("\r{:<12} {}   ", phase.label(), format_clock(*seconds_remaining));
            let _ = std::io::stdout().flush();
        }
        Event::TimerStarted { phase, .. } => println!("\n{} started", phase.label()),
        Event::TimerPaused {
            seconds_remaining, ..
        } => println!("\npaused at {}", format_clock(*seconds_remaining)),
        Event::TimerReset { phase, .. } => println!("\n{} reset", phase.label()),
        Event::PhaseSkipped { from, to, .. } => {
            println!("\nskipped {} -> {}", from.label(), to.label());
        }
        Event::BreakExtended { extra_secs, .. } => {
            println!("\nbreak extended by {}", format_clock(*extra_secs));
        }
        Event::TimerCompleted { phase, .. } => {
            println!("\n{} finished at {}", phase.label(), clock_time(event));
            if let Some(prompt) = coordinator.handle_event(event) {
                print_prompt(coordinator, prompt);
            }
        }
        Event::StateSnapshot { .. } => {}
    }
}

/// Local wall-clock time of an event, `HH:MM`.
fn clock_time(event: &Event) -> String {
    event.at().with_timezone(&Local).format("%H:%M").to_string()
}

fn print_prompt(coordinator: &Coordinator, prompt: Prompt) {
    println!("== {} ==", prompt.title());
    println!("{}", prompt.message(&coordinator.settings()));
    println!("{}", choices(prompt));
}

/// The session words that answer `prompt`.
fn choices(prompt: Prompt) -> String {
    prompt
        .actions()
        .iter()
        .map(|action| match action {
            PromptAction::StartBreak => "[break] start break",
            PromptAction::SkipBreak => "[skip-break] skip break",
            PromptAction::ContinueWork => "[work] start working",
            PromptAction::Dismiss => "[dismiss] close",
        })
        .chain(std::iter::once("[dismiss] close"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_status(coordinator: &Coordinator, snapshot: &Event) {
    let Some(view) = coordinator.focus_view(snapshot) else {
        return;
    };
    let state = if view.running { "running" } else { "paused" };
    print!("{} {} ({state})", view.label, view.clock);
    if view.phase.is_break() {
        println!("  {:.0}% done", view.progress_pct);
        for tip in view.phase.break_tips() {
            println!("  - {tip}");
        }
    } else {
        println!("  pomodoro {}/{}", view.cycle_index, view.cycle_length);
    }
    match view.task {
        Some(text) => println!("Current focus: {text}"),
        None => println!("No task selected. Use 'next' to pick one from the queue."),
    }
}

fn show_tasks(coordinator: &Coordinator) {
    let tasks: Vec<_> = coordinator.tasks().iter().collect();
    print_tasks(&tasks, coordinator.completed_count(), tasks.len());
}

fn show_queue(coordinator: &Coordinator) {
    let queue = coordinator.priority_queue();
    if queue.is_empty() {
        println!("All tasks completed!");
        return;
    }
    for (i, task) in queue.iter().enumerate() {
        let marker = if i == coordinator.next_index() { '>' } else { ' ' };
        println!("{marker} {}. {}", i + 1, task.text);
    }
}
