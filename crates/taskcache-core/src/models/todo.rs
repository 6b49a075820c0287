use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single task belonging to one user.
///
/// Ids are timestamp-derived and unique within a profile; they carry no
/// ordering guarantee beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
}

/// Derived views over a user's todo list. Never mutates storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Pending,
}

impl FilterMode {
    /// Parse a filter name as used by the UI filter control.
    /// Unknown values fall back to `All`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "completed" => FilterMode::Completed,
            "pending" => FilterMode::Pending,
            _ => FilterMode::All,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Completed => "Completed",
            FilterMode::Pending => "Pending",
        }
    }

    /// Whether a todo belongs to this view.
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => todo.completed,
            FilterMode::Pending => !todo.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(completed: bool) -> Todo {
        Todo {
            id: 1,
            task: "water the plants".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            completed,
            created_at: Utc::now(),
            owner_id: "demo-user".to_string(),
        }
    }

    #[test]
    fn test_filter_mode_from_str() {
        assert_eq!(FilterMode::from_str("completed"), FilterMode::Completed);
        assert_eq!(FilterMode::from_str("Pending"), FilterMode::Pending);
        assert_eq!(FilterMode::from_str("all"), FilterMode::All);
        assert_eq!(FilterMode::from_str("bogus"), FilterMode::All);
    }

    #[test]
    fn test_filter_mode_matches() {
        assert!(FilterMode::All.matches(&todo(true)));
        assert!(FilterMode::All.matches(&todo(false)));
        assert!(FilterMode::Completed.matches(&todo(true)));
        assert!(!FilterMode::Completed.matches(&todo(false)));
        assert!(FilterMode::Pending.matches(&todo(false)));
        assert!(!FilterMode::Pending.matches(&todo(true)));
    }
}
