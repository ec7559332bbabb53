use super::storage::Storage;
use super::store::Store;
use super::task::Task;

/// Single-slot edit buffer held by the front end, never persisted.
///
/// Starting a new edit replaces the current one without asking; unsaved draft
/// text is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditSession {
    editing_task_id: Option<String>,
    editing_text: String,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, task: &Task) {
        self.editing_task_id = Some(task.id.clone());
        self.editing_text = task.title.clone();
    }

    /// Begins editing `id` if the store has it.
    pub fn begin_by_id<S: Storage>(&mut self, store: &Store<S>, id: &str) -> bool {
        match store.get(id) {
            Some(task) => {
                self.begin(task);
                true
            }
            None => false,
        }
    }

    pub fn editing_task_id(&self) -> Option<&str> {
        self.editing_task_id.as_deref()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_task_id.as_deref() == Some(id)
    }

    pub fn draft(&self) -> &str {
        &self.editing_text
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.editing_text = text.into();
    }

    pub fn cancel(&mut self) {
        self.editing_task_id = None;
        self.editing_text.clear();
    }

    /// Saves the draft through [`Store::edit`].
    ///
    /// A draft equal to the current title closes the session without
    /// touching the store. A blank draft leaves the session open. A task
    /// that no longer exists closes it.
    pub fn commit<S: Storage>(&mut self, store: &mut Store<S>) -> CommitOutcome {
        let Some(id) = self.editing_task_id.clone() else {
            return CommitOutcome::Missing;
        };

        let draft = self.editing_text.trim();
        if draft.is_empty() {
            return CommitOutcome::Blank;
        }

        let unchanged = store.get(&id).map(|task| task.title == draft);
        let outcome = match unchanged {
            None => CommitOutcome::Missing,
            Some(true) => CommitOutcome::Unchanged,
            Some(false) => match store.edit(&id, draft) {
                Some(task) => CommitOutcome::Saved(task),
                None => CommitOutcome::Missing,
            },
        };
        self.cancel();
        outcome
    }
}

/// Result of [`EditSession::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved(Task),
    /// Draft matched the stored title; nothing was written.
    Unchanged,
    /// Draft was blank; the session is still open.
    Blank,
    /// No session, or the task is gone.
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::storage::{MemoryStorage, TASKS_KEY};

    fn store_with(titles: &[&str]) -> Store<MemoryStorage> {
        let mut store = Store::load(MemoryStorage::new());
        for title in titles {
            store.create(title);
        }
        store
    }

    #[test]
    fn test_begin_copies_title() {
        let store = store_with(&["Buy milk"]);
        let mut session = EditSession::new();
        let id = store.tasks()[0].id.clone();

        assert!(session.begin_by_id(&store, &id));
        assert!(session.is_editing(&id));
        assert_eq!(session.draft(), "Buy milk");
    }

    #[test]
    fn test_begin_unknown_id_keeps_session_closed() {
        let store = store_with(&["x"]);
        let mut session = EditSession::new();
        assert!(!session.begin_by_id(&store, "missing"));
        assert!(session.editing_task_id().is_none());
    }

    #[test]
    fn test_new_edit_replaces_active_one() {
        let store = store_with(&["first", "second"]);
        let mut session = EditSession::new();

        session.begin(&store.tasks()[0]);
        session.set_draft("unsaved change");
        session.begin(&store.tasks()[1]);

        assert!(session.is_editing(&store.tasks()[1].id));
        assert_eq!(session.draft(), "second");
    }

    #[test]
    fn test_commit_applies_and_closes() {
        let mut store = store_with(&["Buy milk"]);
        let mut session = EditSession::new();
        session.begin(&store.tasks()[0]);
        session.set_draft("  Buy almond milk ");

        let CommitOutcome::Saved(updated) = session.commit(&mut store) else {
            panic!("edit was not saved");
        };
        assert_eq!(updated.title, "Buy almond milk");
        assert_eq!(store.tasks()[0].title, "Buy almond milk");
        assert!(session.editing_task_id().is_none());
        assert_eq!(session.draft(), "");
    }

    #[test]
    fn test_commit_blank_draft_stays_open() {
        let mut store = store_with(&["keep"]);
        let mut session = EditSession::new();
        session.begin(&store.tasks()[0]);
        session.set_draft("   ");

        assert_eq!(session.commit(&mut store), CommitOutcome::Blank);
        assert!(session.is_editing(&store.tasks()[0].id));
        assert_eq!(store.tasks()[0].title, "keep");
    }

    #[test]
    fn test_commit_after_delete_closes_session() {
        let mut store = store_with(&["gone"]);
        let mut session = EditSession::new();
        let id = store.tasks()[0].id.clone();
        session.begin(&store.tasks()[0]);
        store.delete(&id);

        session.set_draft("new title");
        assert_eq!(session.commit(&mut store), CommitOutcome::Missing);
        assert!(session.editing_task_id().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_commit_without_session_is_noop() {
        let mut store = store_with(&["x"]);
        let mut session = EditSession::new();
        session.set_draft("stray");
        assert_eq!(session.commit(&mut store), CommitOutcome::Missing);
        assert_eq!(store.tasks()[0].title, "x");
    }

    #[test]
    fn test_commit_unchanged_title_leaves_task_untouched() {
        let mut store = store_with(&["Buy milk"]);
        let before = store.tasks()[0].clone();
        let stored_before = store.storage().read(TASKS_KEY).unwrap();

        let mut session = EditSession::new();
        session.begin(&before);
        session.set_draft(" Buy milk  ");

        assert_eq!(session.commit(&mut store), CommitOutcome::Unchanged);
        assert!(session.editing_task_id().is_none());
        assert_eq!(store.tasks()[0], before);
        assert_eq!(store.storage().read(TASKS_KEY).unwrap(), stored_before);
    }
}
