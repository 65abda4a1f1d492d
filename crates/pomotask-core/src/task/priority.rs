use super::Task;

/// Hand-ordered view of the incomplete tasks plus a "next task" pointer.
///
/// The view is a copy. [`Prioritizer::sync`] rebuilds it from the store in
/// store order and points back at the first entry, so manual reordering
/// lasts until the task list changes.
#[derive(Debug, Clone, Default)]
pub struct Prioritizer {
    tasks: Vec<Task>,
    next_index: usize,
}

impl Prioritizer {
    pub fn new(source: &[Task]) -> Self {
        let mut prioritizer = Self::default();
        prioritizer.sync(source);
        prioritizer
    }

    /// Rebuild from the store's list.
    pub fn sync(&mut self, source: &[Task]) {
        self.tasks = source.iter().filter(|t| !t.completed).cloned().collect();
        self.next_index = 0;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Swap entry `index` with the one above it.
    pub fn move_up(&mut self, index: usize) {
        if index == 0 || index >= self.tasks.len() {
            return;
        }
        self.swap(index, index - 1);
    }

    /// Swap entry `index` with the one below it.
    pub fn move_down(&mut self, index: usize) {
        if index >= self.tasks.len().saturating_sub(1) {
            return;
        }
        self.swap(index, index + 1);
    }

    /// The task the pointer is on.
    pub fn select_next(&self) -> Option<&Task> {
        self.tasks.get(self.next_index)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tasks.swap(a, b);
        if self.next_index == a {
            self.next_index = b;
        } else if self.next_index == b {
            self.next_index = a;
        }
    }
}
