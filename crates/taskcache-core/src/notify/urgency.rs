use chrono::NaiveDate;

/// Days between today and the due date, negative when overdue.
/// Day granularity only - no time-of-day component is meaningful.
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    due_date.signed_duration_since(today).num_days()
}

/// Due-date-relative bucket for an incomplete task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue { days: i64 },
    DueToday,
    DueTomorrow,
    DueSoon { days: i64 },
    Normal,
}

impl Urgency {
    pub fn classify(days_until_due: i64) -> Self {
        match days_until_due {
            d if d < 0 => Urgency::Overdue { days: -d },
            0 => Urgency::DueToday,
            1 => Urgency::DueTomorrow,
            2..=3 => Urgency::DueSoon {
                days: days_until_due,
            },
            _ => Urgency::Normal,
        }
    }

    pub fn of(due_date: NaiveDate, today: NaiveDate) -> Self {
        Self::classify(days_until_due(due_date, today))
    }

    /// Buckets that trigger a notification at all.
    pub fn needs_alert(&self) -> bool {
        matches!(
            self,
            Urgency::Overdue { .. } | Urgency::DueToday | Urgency::DueTomorrow
        )
    }

    /// Buckets that additionally trigger an audible alert.
    pub fn is_critical(&self) -> bool {
        matches!(self, Urgency::Overdue { .. } | Urgency::DueToday)
    }

    /// Row icon for rendering.
    pub fn icon(&self) -> &'static str {
        match self {
            Urgency::Overdue { .. } => "❌",
            Urgency::DueToday => "🚨",
            Urgency::DueTomorrow => "⚠️",
            Urgency::DueSoon { .. } => "⏰",
            Urgency::Normal => "📋",
        }
    }

    /// Badge text for rendering, empty for normal tasks.
    pub fn badge(&self) -> Option<String> {
        match self {
            Urgency::Overdue { days } => Some(format!(
                "{} day{} overdue",
                days,
                if *days > 1 { "s" } else { "" }
            )),
            Urgency::DueToday => Some("Due Today".to_string()),
            Urgency::DueTomorrow => Some("Due Tomorrow".to_string()),
            Urgency::DueSoon { days } => Some(format!("{} days left", days)),
            Urgency::Normal => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_until_due() {
        let today = date(2025, 6, 10);
        assert_eq!(days_until_due(date(2025, 6, 10), today), 0);
        assert_eq!(days_until_due(date(2025, 6, 9), today), -1);
        assert_eq!(days_until_due(date(2025, 6, 11), today), 1);
        assert_eq!(days_until_due(date(2025, 6, 13), today), 3);
    }

    #[test]
    fn test_classification_buckets() {
        let today = date(2025, 6, 10);
        assert_eq!(Urgency::of(date(2025, 6, 10), today), Urgency::DueToday);
        assert_eq!(
            Urgency::of(date(2025, 6, 9), today),
            Urgency::Overdue { days: 1 }
        );
        assert_eq!(Urgency::of(date(2025, 6, 11), today), Urgency::DueTomorrow);
        assert_eq!(
            Urgency::of(date(2025, 6, 13), today),
            Urgency::DueSoon { days: 3 }
        );
        assert_eq!(Urgency::of(date(2025, 6, 20), today), Urgency::Normal);
    }

    #[test]
    fn test_alert_and_critical_flags() {
        assert!(Urgency::Overdue { days: 2 }.needs_alert());
        assert!(Urgency::DueToday.needs_alert());
        assert!(Urgency::DueTomorrow.needs_alert());
        assert!(!Urgency::DueSoon { days: 2 }.needs_alert());
        assert!(!Urgency::Normal.needs_alert());

        assert!(Urgency::Overdue { days: 1 }.is_critical());
        assert!(Urgency::DueToday.is_critical());
        assert!(!Urgency::DueTomorrow.is_critical());
    }

    #[test]
    fn test_badges() {
        assert_eq!(
            Urgency::Overdue { days: 1 }.badge().unwrap(),
            "1 day overdue"
        );
        assert_eq!(
            Urgency::Overdue { days: 3 }.badge().unwrap(),
            "3 days overdue"
        );
        assert_eq!(Urgency::DueSoon { days: 2 }.badge().unwrap(), "2 days left");
        assert!(Urgency::Normal.badge().is_none());
    }
}
