//! Durable local key-value persistence.
//!
//! This module provides the `Store`, a typed persistence layer over JSON
//! files in the application data directory. Three logical keys exist:
//!
//! - `users.json`: the user registry, a map from email to `User`
//! - `session.json`: the currently authenticated user, if any
//! - `todos.json`: per-user todo lists, a map from user id to `Vec<Todo>`
//!
//! Every read deserializes the full blob and every write serializes it
//! back; collections are small enough that batching is not a concern.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Todo, User};

/// User registry file name in the data directory
const USERS_FILE: &str = "users.json";

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Per-user todo lists file name in the data directory
const TODOS_FILE: &str = "todos.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Typed persistence over JSON files in a data directory.
/// Clone is cheap - only the directory path is held.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(self.path(name), contents)?;
        debug!(file = name, "store write");
        Ok(())
    }

    // ===== User registry =====

    /// Load the user registry, keyed by email. Missing file is an empty registry.
    pub fn load_users(&self) -> Result<HashMap<String, User>, StoreError> {
        Ok(self.read_json(USERS_FILE)?.unwrap_or_default())
    }

    pub fn save_users(&self, users: &HashMap<String, User>) -> Result<(), StoreError> {
        self.write_json(USERS_FILE, users)
    }

    // ===== Session =====

    pub fn load_session(&self) -> Result<Option<User>, StoreError> {
        self.read_json(SESSION_FILE)
    }

    pub fn save_session(&self, user: &User) -> Result<(), StoreError> {
        self.write_json(SESSION_FILE, user)
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        let path = self.path(SESSION_FILE);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    // ===== Todo lists =====

    /// Load one user's todo list. Unknown users have an empty list.
    pub fn load_todos(&self, owner_id: &str) -> Result<Vec<Todo>, StoreError> {
        let all: HashMap<String, Vec<Todo>> = self.read_json(TODOS_FILE)?.unwrap_or_default();
        Ok(all.get(owner_id).cloned().unwrap_or_default())
    }

    /// Replace one user's todo list, leaving other users' lists untouched.
    pub fn save_todos(&self, owner_id: &str, todos: &[Todo]) -> Result<(), StoreError> {
        let mut all: HashMap<String, Vec<Todo>> = self.read_json(TODOS_FILE)?.unwrap_or_default();
        all.insert(owner_id.to_string(), todos.to_vec());
        self.write_json(TODOS_FILE, &all)
    }
}

// ============================================================================
// Tests
// ============================================================================
