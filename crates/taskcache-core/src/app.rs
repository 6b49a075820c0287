//! Application state for taskcache.
//!
//! `App` owns the auth and todo managers and exposes the state-transition
//! methods UI adapters call. Nothing here renders anything; event bindings
//! stay thin and all session scoping happens in one place.

use chrono::{NaiveDate, Utc};

use crate::auth::{AuthError, AuthManager};
use crate::models::{FilterMode, Todo, User};
use crate::notify::{DeadlineAlert, DeadlineNotifier, NotificationSink};
use crate::store::Store;
use crate::todos::{TodoError, TodoManager};

/// Application state: the current session plus both managers over one store.
pub struct App {
    auth: AuthManager,
    todos: TodoManager,
}

impl App {
    pub fn new(store: Store) -> Result<Self, AuthError> {
        Ok(Self {
            auth: AuthManager::new(store.clone())?,
            todos: TodoManager::new(store),
        })
    }

    // ===== Session =====

    pub fn current_user(&self) -> Option<&User> {
        self.auth.current()
    }

    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        self.auth.register(name, email, password, confirm_password)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        self.auth.login(email, password)
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.auth.logout()
    }

    fn require_session(&self) -> Result<String, TodoError> {
        self.auth
            .current()
            .map(|user| user.id.clone())
            .ok_or(TodoError::NoSession)
    }

    // ===== Todos, scoped to the current session =====

    pub fn add_todo(&mut self, task: &str, due_date: Option<NaiveDate>) -> Result<Todo, TodoError> {
        let owner = self.require_session()?;
        self.todos.add(&owner, task, due_date)
    }

    pub fn toggle_complete(&mut self, id: i64) -> Result<(), TodoError> {
        let owner = self.require_session()?;
        self.todos.toggle_complete(&owner, id)
    }

    pub fn edit_todo(&mut self, id: i64, new_task: &str) -> Result<(), TodoError> {
        let owner = self.require_session()?;
        self.todos.edit(&owner, id, new_task)
    }

    pub fn delete_todo(&mut self, id: i64) -> Result<(), TodoError> {
        let owner = self.require_session()?;
        self.todos.delete(&owner, id)
    }

    /// Clears the whole list. Callers own the confirmation step.
    pub fn delete_all_todos(&mut self) -> Result<(), TodoError> {
        let owner = self.require_session()?;
        self.todos.delete_all(&owner)
    }

    pub fn todos(&self, mode: FilterMode) -> Result<Vec<Todo>, TodoError> {
        let owner = self.require_session()?;
        self.todos.filter(&owner, mode)
    }

    // ===== Deadlines =====

    /// Scan the current user's tasks now and emit any due alerts.
    pub fn check_deadlines<S: NotificationSink>(
        &self,
        notifier: &DeadlineNotifier<S>,
    ) -> Result<Vec<DeadlineAlert>, TodoError> {
        let owner = self.require_session()?;
        let todos = self.todos.list(&owner)?;
        Ok(notifier.check(&todos, Utc::now().date_naive()))
    }
}

// ============================================================================
// Tests
// ============================================================================
