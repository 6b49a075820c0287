use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::{FilterMode, Todo};
use crate::store::Store;

use super::TodoError;

/// Task CRUD for one user partition at a time.
///
/// Every mutation rewrites the owner's full list immediately; there is no
/// batching and no partial write.
pub struct TodoManager {
    store: Store,
    last_id: i64,
}

impl TodoManager {
    pub fn new(store: Store) -> Self {
        Self { store, last_id: 0 }
    }

    /// Timestamp-derived id, bumped past the last one handed out so two
    /// adds within the same millisecond stay unique.
    fn fresh_id(&mut self, existing: &[Todo]) -> i64 {
        let floor = existing.iter().map(|t| t.id).max().unwrap_or(0);
        let id = Utc::now()
            .timestamp_millis()
            .max(self.last_id + 1)
            .max(floor + 1);
        self.last_id = id;
        id
    }

    /// Add a task for `owner_id`. The task text must be non-blank and a due
    /// date is required.
    pub fn add(
        &mut self,
        owner_id: &str,
        task: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Todo, TodoError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(ValidationError::EmptyTask.into());
        }
        let due_date = due_date.ok_or(ValidationError::MissingDueDate)?;

        let mut todos = self.store.load_todos(owner_id)?;
        let todo = Todo {
            id: self.fresh_id(&todos),
            task: task.to_string(),
            due_date,
            completed: false,
            created_at: Utc::now(),
            owner_id: owner_id.to_string(),
        };
        todos.push(todo.clone());
        self.store.save_todos(owner_id, &todos)?;
        info!(owner = owner_id, id = todo.id, "added todo");
        Ok(todo)
    }

    /// Flip the completed flag. Absent ids are a logged no-op.
    pub fn toggle_complete(&mut self, owner_id: &str, id: i64) -> Result<(), TodoError> {
        let mut todos = self.store.load_todos(owner_id)?;
        match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                self.store.save_todos(owner_id, &todos)?;
            }
            None => debug!(owner = owner_id, id, "toggle on unknown todo ignored"),
        }
        Ok(())
    }

    /// Replace the task text when the new text is non-blank after trimming;
    /// otherwise leave the todo untouched.
    pub fn edit(&mut self, owner_id: &str, id: i64, new_task: &str) -> Result<(), TodoError> {
        let new_task = new_task.trim();
        if new_task.is_empty() {
            debug!(owner = owner_id, id, "edit with blank text ignored");
            return Ok(());
        }
        let mut todos = self.store.load_todos(owner_id)?;
        match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.task = new_task.to_string();
                self.store.save_todos(owner_id, &todos)?;
            }
            None => debug!(owner = owner_id, id, "edit on unknown todo ignored"),
        }
        Ok(())
    }

    /// Remove one todo by id.
    pub fn delete(&mut self, owner_id: &str, id: i64) -> Result<(), TodoError> {
        let mut todos = self.store.load_todos(owner_id)?;
        todos.retain(|t| t.id != id);
        self.store.save_todos(owner_id, &todos)?;
        info!(owner = owner_id, id, "deleted todo");
        Ok(())
    }

    /// Clear the owner's whole list. Confirmation is the caller's concern.
    pub fn delete_all(&mut self, owner_id: &str) -> Result<(), TodoError> {
        self.store.save_todos(owner_id, &[])?;
        info!(owner = owner_id, "deleted all todos");
        Ok(())
    }

    /// All of the owner's todos, unfiltered.
    pub fn list(&self, owner_id: &str) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.load_todos(owner_id)?)
    }

    /// Derived view by filter mode; storage is never mutated.
    pub fn filter(&self, owner_id: &str, mode: FilterMode) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.load_todos(owner_id)?;
        Ok(todos.into_iter().filter(|t| mode.matches(t)).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "demo-user";

    fn manager() -> (tempfile::TempDir, TodoManager) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().to_path_buf()).unwrap();
        (dir, TodoManager::new(store))
    }

    fn due() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, 1)
    }

    #[test]
    fn test_add_requires_task_and_due_date() {
        let (_dir, mut manager) = manager();

        let err = manager.add(OWNER, "   ", due()).unwrap_err();
        assert!(matches!(
            err,
            TodoError::Validation(ValidationError::EmptyTask)
        ));

        let err = manager.add(OWNER, "write report", None).unwrap_err();
        assert!(matches!(
            err,
            TodoError::Validation(ValidationError::MissingDueDate)
        ));

        let todo = manager.add(OWNER, "  write report  ", due()).unwrap();
        assert_eq!(todo.task, "write report");
        assert!(!todo.completed);
        assert_eq!(todo.owner_id, OWNER);
    }

    #[test]
    fn test_ids_are_unique_within_a_burst() {
        let (_dir, mut manager) = manager();
        let a = manager.add(OWNER, "one", due()).unwrap();
        let b = manager.add(OWNER, "two", due()).unwrap();
        let c = manager.add(OWNER, "three", due()).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_delete_shrinks_list_by_one() {
        let (_dir, mut manager) = manager();
        let a = manager.add(OWNER, "one", due()).unwrap();
        manager.add(OWNER, "two", due()).unwrap();

        manager.delete(OWNER, a.id).unwrap();
        let remaining = manager.list(OWNER).unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|t| t.id != a.id));
    }

    #[test]
    fn test_toggle_complete_is_reversible() {
        let (_dir, mut manager) = manager();
        let todo = manager.add(OWNER, "one", due()).unwrap();

        manager.toggle_complete(OWNER, todo.id).unwrap();
        assert!(manager.list(OWNER).unwrap()[0].completed);

        manager.toggle_complete(OWNER, todo.id).unwrap();
        assert!(!manager.list(OWNER).unwrap()[0].completed);

        // Unknown id is a no-op
        manager.toggle_complete(OWNER, 424242).unwrap();
        assert_eq!(manager.list(OWNER).unwrap().len(), 1);
    }

    #[test]
    fn test_edit_ignores_blank_text() {
        let (_dir, mut manager) = manager();
        let todo = manager.add(OWNER, "draft email", due()).unwrap();

        manager.edit(OWNER, todo.id, "  send email  ").unwrap();
        assert_eq!(manager.list(OWNER).unwrap()[0].task, "send email");

        manager.edit(OWNER, todo.id, "   ").unwrap();
        assert_eq!(manager.list(OWNER).unwrap()[0].task, "send email");
    }

    #[test]
    fn test_filters_partition_the_list() {
        let (_dir, mut manager) = manager();
        let a = manager.add(OWNER, "one", due()).unwrap();
        manager.add(OWNER, "two", due()).unwrap();
        manager.toggle_complete(OWNER, a.id).unwrap();

        let all = manager.filter(OWNER, FilterMode::All).unwrap();
        let completed = manager.filter(OWNER, FilterMode::Completed).unwrap();
        let pending = manager.filter(OWNER, FilterMode::Pending).unwrap();

        assert_eq!(completed.len(), 1);
        assert_eq!(pending.len(), 1);
        assert_eq!(all.len(), completed.len() + pending.len());

        let mut union: Vec<i64> = completed.iter().chain(&pending).map(|t| t.id).collect();
        let mut all_ids: Vec<i64> = all.iter().map(|t| t.id).collect();
        union.sort_unstable();
        all_ids.sort_unstable();
        assert_eq!(union, all_ids);
    }

    #[test]
    fn test_delete_all_clears_only_that_owner() {
        let (_dir, mut manager) = manager();
        manager.add(OWNER, "one", due()).unwrap();
        manager.add("other-user", "theirs", due()).unwrap();

        manager.delete_all(OWNER).unwrap();
        assert!(manager.list(OWNER).unwrap().is_empty());
        assert_eq!(manager.list("other-user").unwrap().len(), 1);
    }
}
