use thiserror::Error;

/// User-input validation failures, surfaced to the UI as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Task cannot be empty")]
    EmptyTask,

    #[error("A due date is required")]
    MissingDueDate,
}
