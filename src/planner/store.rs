use super::storage::{Storage, TASKS_KEY};
use super::task::{Clock, SystemClock, Task};
use crate::error::StorageError;
use std::collections::HashSet;

/// Owns the task collection and keeps its durable copy in step.
///
/// Every mutating operation applies to memory first and then persists the
/// whole collection. Invalid input and unknown ids are no-ops, never errors.
/// A failed write leaves the in-memory collection authoritative; the failure
/// is kept for [`Store::take_persist_error`].
pub struct Store<S: Storage> {
    tasks: Vec<Task>,
    storage: S,
    key: String,
    clock: Box<dyn Clock>,
    persist_error: Option<StorageError>,
}

impl<S: Storage> Store<S> {
    /// Restores the collection stored under the default `tasks` key.
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, TASKS_KEY)
    }

    /// Restores the collection stored under `key`. Missing or unreadable data
    /// yields an empty collection.
    pub fn load_with_key(storage: S, key: &str) -> Self {
        let tasks = match storage.read(key) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Task>>(&content) {
                Ok(tasks) => sanitize(tasks),
                Err(e) => {
                    tracing::warn!(key, error = %e, "stored tasks are malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not read stored tasks, starting empty");
                Vec::new()
            }
        };

        tracing::info!(key, count = tasks.len(), "loaded tasks");

        Self {
            tasks,
            storage,
            key: key.to_string(),
            clock: Box::new(SystemClock),
            persist_error: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Snapshot of the collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn create(&mut self, title: &str) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let task = Task::new(title.to_string(), self.clock.now());
        self.tasks.push(task.clone());
        tracing::info!(id = %task.id, "created task");
        self.persist();
        Some(task)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };

        self.tasks.remove(index);
        tracing::info!(id, "deleted task");
        self.persist();
        true
    }

    pub fn toggle_complete(&mut self, id: &str) -> Option<Task> {
        let now = self.clock.now();
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;

        task.toggle(now);
        let updated = task.clone();
        tracing::info!(id, completed = updated.is_completed, "toggled task");
        self.persist();
        Some(updated)
    }

    pub fn edit(&mut self, id: &str, new_title: &str) -> Option<Task> {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;

        task.update_title(new_title.to_string(), now);
        let updated = task.clone();
        tracing::info!(id, "edited task");
        self.persist();
        Some(updated)
    }

    pub fn clear_all(&mut self) {
        let removed = self.tasks.len();
        self.tasks.clear();
        tracing::info!(removed, "cleared all tasks");
        self.persist();
    }

    /// Writes the full collection. Failures are logged and recorded, not returned.
    pub fn persist(&mut self) {
        let result = serde_json::to_string_pretty(&self.tasks)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&self.key, &json));

        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "failed to persist tasks");
            self.persist_error = Some(e);
        }
    }

    /// Most recent write failure since the last call, if any.
    pub fn take_persist_error(&mut self) -> Option<StorageError> {
        self.persist_error.take()
    }
}

/// Repairs records written by older builds so the model invariants hold.
fn sanitize(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(tasks.len());

    for mut task in tasks {
        let trimmed = task.title.trim();
        if trimmed.is_empty() {
            tracing::warn!(id = %task.id, "dropping stored task with blank title");
            continue;
        }
        if trimmed.len() != task.title.len() {
            task.title = trimmed.to_string();
        }

        if !seen.insert(task.id.clone()) {
            tracing::warn!(id = %task.id, "dropping stored task with duplicate id");
            continue;
        }

        if task.updated_at < task.created_at {
            tracing::warn!(id = %task.id, "stored updatedAt precedes createdAt");
            task.updated_at = task.created_at;
        }

        match (task.is_completed, task.completed_at) {
            (false, Some(_)) => {
                tracing::warn!(id = %task.id, "clearing completedAt on open task");
                task.completed_at = None;
            }
            (true, None) => {
                tracing::warn!(id = %task.id, "completed task missing completedAt");
                task.completed_at = Some(task.updated_at);
            }
            _ => {}
        }

        kept.push(task);
    }

    kept
}
