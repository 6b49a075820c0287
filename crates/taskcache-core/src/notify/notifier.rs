use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::models::Todo;

use super::Urgency;

/// Interval between deadline scans (one hour).
const CHECK_INTERVAL_SECS: u64 = 60 * 60;

/// How long an in-app banner stays up before auto-dismissal.
/// Sinks may use this as their display duration.
pub const BANNER_DISMISS_SECS: u64 = 5;

/// Title used for platform deadline notifications.
const NOTIFICATION_TITLE: &str = "Todo Deadline Alert";

/// Delivery surface for deadline alerts.
///
/// Rendering, OS notification plumbing, and sound synthesis live behind
/// this trait; the notifier only decides what to emit and when. Any method
/// may fail - the notifier logs and continues, it never propagates.
pub trait NotificationSink {
    /// Show an ephemeral in-app banner. Surfaces that can dismiss should
    /// keep it up for [`BANNER_DISMISS_SECS`] seconds.
    fn banner(&self, message: &str) -> Result<()>;

    /// Show a platform (OS-level) notification.
    fn notify(&self, title: &str, body: &str) -> Result<()>;

    /// Play an audible alert.
    fn alert_sound(&self) -> Result<()>;

    /// Whether the user has granted platform notification permission.
    fn permission_granted(&self) -> bool {
        false
    }

    /// Opportunistically ask for permission. Must never block or force.
    fn request_permission(&self) {}
}

/// One emitted deadline alert, returned for inspection by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineAlert {
    pub todo_id: i64,
    pub urgency: Urgency,
    pub message: String,
}

/// Periodic scanner over the current user's tasks.
///
/// Runs once immediately on session start, then hourly. Only incomplete
/// tasks in the overdue/today/tomorrow buckets produce alerts; critical
/// buckets (overdue, today) additionally request the audible alert.
pub struct DeadlineNotifier<S: NotificationSink> {
    sink: S,
}

impl<S: NotificationSink> DeadlineNotifier<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Scan `todos` against `today`, emitting one alert per qualifying task.
    pub fn check(&self, todos: &[Todo], today: NaiveDate) -> Vec<DeadlineAlert> {
        let mut alerts = Vec::new();
        for todo in todos {
            if todo.completed {
                continue;
            }
            let urgency = Urgency::of(todo.due_date, today);
            if !urgency.needs_alert() {
                continue;
            }
            let alert = DeadlineAlert {
                todo_id: todo.id,
                urgency,
                message: Self::message_for(&todo.task, urgency),
            };
            self.emit(&alert);
            alerts.push(alert);
        }
        alerts
    }

    fn message_for(task: &str, urgency: Urgency) -> String {
        match urgency {
            Urgency::DueTomorrow => format!("⚠️ Task \"{}\" is due tomorrow!", task),
            Urgency::DueToday => format!("🚨 Task \"{}\" is due TODAY!", task),
            Urgency::Overdue { .. } => format!("❌ Task \"{}\" is OVERDUE!", task),
            _ => format!("Task \"{}\" is coming up", task),
        }
    }

    /// Push one alert through every channel, logging failures instead of
    /// propagating them.
    fn emit(&self, alert: &DeadlineAlert) {
        if let Err(e) = self.sink.banner(&alert.message) {
            warn!(todo_id = alert.todo_id, error = %e, "in-app banner failed");
        }

        if self.sink.permission_granted() {
            if let Err(e) = self.sink.notify(NOTIFICATION_TITLE, &alert.message) {
                warn!(todo_id = alert.todo_id, error = %e, "platform notification failed");
            }
        }

        if alert.urgency.is_critical() {
            if let Err(e) = self.sink.alert_sound() {
                // Audio is best-effort on every platform
                debug!(todo_id = alert.todo_id, error = %e, "alert sound unavailable");
            }
        }
    }

    /// Run the scan loop: once immediately, then on a fixed hourly interval.
    /// `todos` is polled fresh on every tick so edits between ticks count.
    pub async fn run<F>(&self, mut todos: F)
    where
        F: FnMut() -> Vec<Todo>,
    {
        self.sink.request_permission();

        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(CHECK_INTERVAL_SECS));
        loop {
            // First tick completes immediately
            interval.tick().await;
            let list = todos();
            let today = Utc::now().date_naive();
            let alerts = self.check(&list, today);
            debug!(count = alerts.len(), "deadline scan complete");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        banners: Mutex<Vec<String>>,
        notifications: Mutex<Vec<String>>,
        sounds: Mutex<usize>,
        granted: bool,
        fail_banner: bool,
    }

    impl NotificationSink for RecordingSink {
        fn banner(&self, message: &str) -> Result<()> {
            if self.fail_banner {
                anyhow::bail!("banner surface unavailable");
            }
            self.banners.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn notify(&self, _title: &str, body: &str) -> Result<()> {
            self.notifications.lock().unwrap().push(body.to_string());
            Ok(())
        }

        fn alert_sound(&self) -> Result<()> {
            *self.sounds.lock().unwrap() += 1;
            Ok(())
        }

        fn permission_granted(&self) -> bool {
            self.granted
        }
    }

    fn todo(id: i64, due: NaiveDate, completed: bool) -> Todo {
        Todo {
            id,
            task: format!("task-{}", id),
            due_date: due,
            completed,
            created_at: Utc::now(),
            owner_id: "demo-user".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_check_emits_for_urgent_incomplete_tasks_only() {
        let today = date(2025, 6, 10);
        let todos = vec![
            todo(1, date(2025, 6, 9), false),  // overdue
            todo(2, date(2025, 6, 10), false), // today
            todo(3, date(2025, 6, 11), false), // tomorrow
            todo(4, date(2025, 6, 12), false), // due soon: no alert
            todo(5, date(2025, 6, 9), true),   // completed: never alerts
        ];

        let notifier = DeadlineNotifier::new(RecordingSink::default());
        let alerts = notifier.check(&todos, today);

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].urgency, Urgency::Overdue { days: 1 });
        assert_eq!(alerts[1].urgency, Urgency::DueToday);
        assert_eq!(alerts[2].urgency, Urgency::DueTomorrow);

        let banners = notifier.sink().banners.lock().unwrap();
        assert_eq!(banners.len(), 3);
        assert!(banners[0].contains("OVERDUE"));
        assert!(banners[1].contains("due TODAY"));
        assert!(banners[2].contains("due tomorrow"));

        // Sound only for the two critical buckets
        assert_eq!(*notifier.sink().sounds.lock().unwrap(), 2);
    }

    #[test]
    fn test_platform_notifications_gated_on_permission() {
        let today = date(2025, 6, 10);
        let todos = vec![todo(1, today, false)];

        let denied = DeadlineNotifier::new(RecordingSink::default());
        denied.check(&todos, today);
        assert!(denied.sink().notifications.lock().unwrap().is_empty());

        let granted = DeadlineNotifier::new(RecordingSink {
            granted: true,
            ..RecordingSink::default()
        });
        granted.check(&todos, today);
        assert_eq!(granted.sink().notifications.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sink_failure_does_not_stop_the_scan() {
        let today = date(2025, 6, 10);
        let todos = vec![todo(1, today, false), todo(2, today, false)];

        let notifier = DeadlineNotifier::new(RecordingSink {
            fail_banner: true,
            ..RecordingSink::default()
        });
        let alerts = notifier.check(&todos, today);

        // Both tasks still produce alerts and reach the other channels
        assert_eq!(alerts.len(), 2);
        assert_eq!(*notifier.sink().sounds.lock().unwrap(), 2);
    }
}
