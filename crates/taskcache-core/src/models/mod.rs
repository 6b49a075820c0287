//! Data models for taskcache entities.
//!
//! This module contains the data structures shared across the store,
//! auth, todo, and notification layers:
//!
//! - `User`: registered account with plaintext credentials (local-only app)
//! - `Todo`: a task with a day-granularity due date and owner
//! - `FilterMode`: derived views over a todo list

pub mod todo;
pub mod user;

pub use todo::{FilterMode, Todo};
pub use user::User;
