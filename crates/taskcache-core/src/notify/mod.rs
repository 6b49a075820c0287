//! Deadline scanning and notification emission.
//!
//! This module provides:
//! - `Urgency`: due-date-relative classification driving alerts and styling
//! - `DeadlineNotifier`: immediate-then-hourly scans of the current user's
//!   tasks, emitting through a `NotificationSink`
//!
//! Sink failures never propagate to the caller; every suppressed failure
//! is logged.

pub mod notifier;
pub mod urgency;

pub use notifier::{DeadlineAlert, DeadlineNotifier, NotificationSink};
pub use urgency::{days_until_due, Urgency};
