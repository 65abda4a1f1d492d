//! Task management commands for CLI.

use clap::Subcommand;
use pomotask_core::{Config, Task, TaskStore, ValidationError};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task
    Add {
        /// Task text
        text: String,
    },
    /// List tasks
    List {
        /// Only incomplete tasks
        #[arg(long)]
        pending: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a task's completion
    Done {
        /// Task ID
        id: u64,
    },
    /// Change a task's text
    Edit {
        /// Task ID
        id: u64,
        /// New text
        text: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },
}

pub fn run(action: TaskAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TaskStore::load(super::open_store(config)?);

    match action {
        TaskAction::Add { text } => {
            let task = store.add(&text)?.ok_or(ValidationError::Empty("text"))?;
            println!("Task added: {}", task.id);
        }
        TaskAction::List { pending, json } => {
            let tasks: Vec<&Task> = store
                .tasks()
                .iter()
                .filter(|t| !pending || !t.completed)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print_tasks(&tasks, store.completed_count(), store.tasks().len());
            }
        }
        TaskAction::Done { id } => {
            let task = store
                .toggle_complete(id)?
                .ok_or(format!("Task not found: {id}"))?;
            let state = if task.completed { "completed" } else { "reopened" };
            println!("Task {state}: {}", task.id);
        }
        TaskAction::Edit { id, text } => {
            if store.get(id).is_none() {
                return Err(format!("Task not found: {id}").into());
            }
            store
                .edit_text(id, &text)?
                .ok_or(ValidationError::Empty("text"))?;
            println!("Task updated: {id}");
        }
        TaskAction::Delete { id } => {
            if !store.delete(id)? {
                return Err(format!("Task not found: {id}").into());
            }
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

pub fn print_tasks(tasks: &[&Task], completed: usize, total: usize) {
    println!("Tasks ({completed}/{total} completed)");
    if tasks.is_empty() {
        println!("  No tasks yet. Add your first task!");
    }
    for task in tasks {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("  [{mark}] {:>4}  {}", task.id, task.text);
    }
}
