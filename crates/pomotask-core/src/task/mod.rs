//! Tasks and their persisted store.
//!
//! The store keeps the list in insertion order under [`TASKS_KEY`] as a JSON
//! array of `{"id","text","completed"}` records. Every mutation is written
//! through immediately.

mod priority;

pub use priority::Prioritizer;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::{KeyValueStore, TASKS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl Task {
    fn seed(id: u64, text: &str, completed: bool) -> Self {
        Self {
            id,
            text: text.to_string(),
            completed,
        }
    }
}

/// List shown before anything has been saved.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task::seed(1, "Complete project requirements", true),
        Task::seed(2, "Design user interface", false),
        Task::seed(3, "Implement core features", false),
        Task::seed(4, "Test application", false),
    ]
}

/// Owner of the task list.
pub struct TaskStore {
    kv: Rc<dyn KeyValueStore>,
    tasks: Vec<Task>,
    /// Highest id ever handed out or loaded. Never decreases.
    last_id: u64,
}

impl TaskStore {
    /// Read the task list from the store.
    ///
    /// Nothing stored yields [`seed_tasks`]; so does unreadable data.
    pub fn load(kv: Rc<dyn KeyValueStore>) -> Self {
        let tasks = match kv.get(TASKS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "malformed stored tasks, using seed list");
                seed_tasks()
            }),
            Ok(None) => seed_tasks(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read tasks, using seed list");
                seed_tasks()
            }
        };
        let last_id = tasks.iter().map(|t: &Task| t.id).max().unwrap_or(0);
        Self { kv, tasks, last_id }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Append a new incomplete task.
    ///
    /// Blank text is ignored and yields `None`.
    ///
    /// # Errors
    /// Returns an error if the list cannot be persisted.
    pub fn add(&mut self, text: &str) -> Result<Option<Task>, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.last_id += 1;
        let task = Task {
            id: self.last_id,
            text: text.to_string(),
            completed: false,
        };
        self.tasks.push(task.clone());
        self.save()?;
        tracing::debug!(id = task.id, "task added");
        Ok(Some(task))
    }

    /// Replace the record with the same id.
    ///
    /// Text is trimmed like [`TaskStore::add`]. Returns `false` for an
    /// unknown id or blank text.
    ///
    /// # Errors
    /// Returns an error if the list cannot be persisted.
    pub fn update(&mut self, mut task: Task) -> Result<bool, CoreError> {
        let trimmed = task.text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        if trimmed.len() != task.text.len() {
            task.text = trimmed.to_string();
        }
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(false);
        };
        *slot = task;
        self.save()?;
        Ok(true)
    }

    /// Flip the completion flag. Returns the updated task.
    ///
    /// # Errors
    /// Returns an error if the list cannot be persisted.
    pub fn toggle_complete(&mut self, id: u64) -> Result<Option<Task>, CoreError> {
        let Some(mut task) = self.get(id).cloned() else {
            return Ok(None);
        };
        task.completed = !task.completed;
        self.update(task.clone())?;
        Ok(Some(task))
    }

    /// Change a task's text. Blank text is ignored.
    ///
    /// # Errors
    /// Returns an error if the list cannot be persisted.
    pub fn edit_text(&mut self, id: u64, text: &str) -> Result<Option<Task>, CoreError> {
        let Some(mut task) = self.get(id).cloned() else {
            return Ok(None);
        };
        task.text = text.trim().to_string();
        if !self.update(task.clone())? {
            return Ok(None);
        }
        Ok(Some(task))
    }

    /// Remove the task with `id`. Returns whether one was removed.
    ///
    /// # Errors
    /// Returns an error if the list cannot be persisted.
    pub fn delete(&mut self, id: u64) -> Result<bool, CoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Write the whole list.
    ///
    /// # Errors
    /// Returns an error if the list cannot be serialized or stored.
    pub fn save(&self) -> Result<(), CoreError> {
        let json = serde_json::to_string(&self.tasks)?;
        self.kv.set(TASKS_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::collections::HashSet;

    fn store() -> (Rc<dyn KeyValueStore>, TaskStore) {
        let kv: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let store = TaskStore::load(kv.clone());
        (kv, store)
    }

    #[test]
    fn empty_store_loads_seed_list() {
        let (_, store) = store();
        assert_eq!(store.tasks(), seed_tasks().as_slice());
        assert_eq!(store.completed_count(), 1);
    }

    #[test]
    fn add_then_delete_restores_the_list() {
        let (_, mut store) = store();
        let before = store.tasks().to_vec();

        let task = store.add("Buy milk").unwrap().unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(store.tasks().len(), before.len() + 1);
        assert_eq!(
            store.tasks().iter().filter(|t| t.id == task.id).count(),
            1
        );

        assert!(store.delete(task.id).unwrap());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn blank_text_is_not_added() {
        let (kv, mut store) = store();
        assert!(store.add("   ").unwrap().is_none());
        assert_eq!(store.tasks().len(), 4);
        assert!(kv.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn add_trims_text() {
        let (_, mut store) = store();
        let task = store.add("  Write report \n").unwrap().unwrap();
        assert_eq!(task.text, "Write report");
    }

    #[test]
    fn ids_are_never_reused() {
        let (_, mut store) = store();
        let a = store.add("a").unwrap().unwrap();
        let b = store.add("b").unwrap().unwrap();
        assert!(b.id > a.id);
        store.delete(b.id).unwrap();
        let c = store.add("c").unwrap().unwrap();
        assert!(c.id > b.id);
    }

    #[test]
    fn rapid_adds_get_distinct_ids() {
        let (_, mut store) = store();
        let ids: HashSet<u64> = (0..100)
            .map(|i| store.add(&format!("task {i}")).unwrap().unwrap().id)
            .collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| *id > 4));
    }

    #[test]
    fn update_trims_text() {
        let (kv, mut store) = store();
        let padded = Task {
            id: 2,
            text: "  Design the UI \n".into(),
            completed: false,
        };
        assert!(store.update(padded).unwrap());
        assert_eq!(store.get(2).unwrap().text, "Design the UI");
        assert_eq!(TaskStore::load(kv).get(2).unwrap().text, "Design the UI");
    }

    #[test]
    fn update_replaces_by_id() {
        let (_, mut store) = store();
        let updated = Task {
            id: 2,
            text: "Design the whole UI".into(),
            completed: true,
        };
        assert!(store.update(updated.clone()).unwrap());
        assert_eq!(store.get(2), Some(&updated));
    }

    #[test]
    fn update_with_unknown_id_is_a_noop() {
        let (kv, mut store) = store();
        let before = store.tasks().to_vec();
        let ghost = Task {
            id: 999,
            text: "ghost".into(),
            completed: false,
        };
        assert!(!store.update(ghost).unwrap());
        assert_eq!(store.tasks(), before.as_slice());
        assert!(kv.get(TASKS_KEY).unwrap().is_none());
    }

    #[test]
    fn delete_unknown_id_is_a_noop() {
        let (_, mut store) = store();
        assert!(!store.delete(42).unwrap());
        assert_eq!(store.tasks().len(), 4);
    }

    #[test]
    fn toggle_and_edit() {
        let (_, mut store) = store();
        let toggled = store.toggle_complete(1).unwrap().unwrap();
        assert!(!toggled.completed);
        assert_eq!(store.completed_count(), 0);

        let edited = store.edit_text(3, "Implement the core").unwrap().unwrap();
        assert_eq!(edited.text, "Implement the core");
        assert!(store.edit_text(3, "  ").unwrap().is_none());
        assert_eq!(store.get(3).unwrap().text, "Implement the core");

        assert!(store.toggle_complete(77).unwrap().is_none());
    }

    #[test]
    fn mutations_are_persisted() {
        let (kv, mut store) = store();
        let task = store.add("Buy milk").unwrap().unwrap();
        store.toggle_complete(2).unwrap();

        let reloaded = TaskStore::load(kv);
        assert_eq!(reloaded.tasks(), store.tasks());
        assert_eq!(reloaded.get(task.id).unwrap().text, "Buy milk");
        assert!(reloaded.get(2).unwrap().completed);
    }

    #[test]
    fn stored_list_wins_over_seed_even_when_empty() {
        let kv: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        kv.set(TASKS_KEY, "[]").unwrap();
        let mut store = TaskStore::load(kv);
        assert!(store.tasks().is_empty());
        assert_eq!(store.add("first").unwrap().unwrap().id, 1);
    }

    #[test]
    fn malformed_list_falls_back_to_seed() {
        let kv: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        kv.set(TASKS_KEY, r#"[{"id":"x"}]"#).unwrap();
        let store = TaskStore::load(kv);
        assert_eq!(store.tasks(), seed_tasks().as_slice());
    }

    #[test]
    fn wire_format_matches_records() {
        let (kv, mut store) = store();
        store.delete(1).unwrap();
        store.delete(2).unwrap();
        store.delete(3).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&kv.get(TASKS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([{"id": 4, "text": "Test application", "completed": false}])
        );
    }
}
