//! One-shot reminders created by the user.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use gradbot_core::UserId;

/// Store-local reminder identifier, allocated from a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReminderId(pub u64);

impl std::fmt::Display for ReminderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rem-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub message: String,
    pub fire_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.sent && self.fire_at <= now
    }
}

/// `now + hours`, or `None` if that overflows chrono's range.
pub fn fire_time(now: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    now.checked_add_signed(Duration::try_hours(hours)?)
}

/// In-memory reminder list, kept in insertion order.
#[derive(Debug, Default)]
pub struct ReminderStore {
    reminders: Vec<Reminder>,
    next_id: u64,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `message` for `owner` at `now + hours_from_now`. Zero or
    /// negative hours make it due immediately. `None` when the fire time
    /// falls outside the representable date range; nothing is stored then.
    pub fn add(
        &mut self,
        message: &str,
        hours_from_now: i64,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Option<Reminder> {
        let fire_at = fire_time(now, hours_from_now)?;
        self.next_id += 1;
        let reminder = Reminder {
            id: ReminderId(self.next_id),
            message: message.to_string(),
            fire_at,
            owner_id: owner,
            sent: false,
            created_at: now,
            sent_at: None,
        };
        tracing::debug!("⏰ Reminder {} set for {}", reminder.id, reminder.fire_at);
        self.reminders.push(reminder.clone());
        Some(reminder)
    }

    /// Unsent reminders whose fire time has passed, oldest insertion first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect()
    }

    /// Unknown ids are ignored.
    pub fn mark_sent(&mut self, id: ReminderId, now: DateTime<Utc>) {
        if let Some(reminder) = self.reminders.iter_mut().find(|r| r.id == id) {
            reminder.sent = true;
            reminder.sent_at = Some(now);
        }
    }

    /// Drop sent reminders. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        let before = self.reminders.len();
        self.reminders.retain(|r| !r.sent);
        before - self.reminders.len()
    }

    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn active(&self) -> Vec<Reminder> {
        self.reminders.iter().filter(|r| !r.sent).cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.reminders.iter().filter(|r| !r.sent).count()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn owner() -> UserId {
        UserId::new("1001")
    }

    #[test]
    fn test_due_exactly_at_fire_time() {
        let mut store = ReminderStore::new();
        let r = store.add("study", 3, owner(), now()).unwrap();
        assert_eq!(r.fire_at, now() + Duration::hours(3));

        let just_before = now() + Duration::hours(3) - Duration::milliseconds(1);
        assert!(store.due(just_before).is_empty());
        assert_eq!(store.due(now() + Duration::hours(3)).len(), 1);
        assert_eq!(store.due(now() + Duration::days(2)).len(), 1);
    }

    #[test]
    fn test_past_reminder_is_immediately_due() {
        let mut store = ReminderStore::new();
        store.add("late", -1, owner(), now());
        let due = store.due(now());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message, "late");
    }

    #[test]
    fn test_mark_sent_removes_from_due() {
        let mut store = ReminderStore::new();
        let r = store.add("x", 0, owner(), now()).unwrap();
        store.mark_sent(r.id, now());
        assert!(store.due(now()).is_empty());
        assert!(store.due(now() + Duration::days(30)).is_empty());

        let stored = store.get(r.id).unwrap();
        assert!(stored.sent);
        assert_eq!(stored.sent_at, Some(now()));
    }

    #[test]
    fn test_mark_sent_unknown_id_is_noop() {
        let mut store = ReminderStore::new();
        store.add("x", 0, owner(), now());
        store.mark_sent(ReminderId(999), now());
        assert_eq!(store.due(now()).len(), 1);
    }

    #[test]
    fn test_due_keeps_insertion_order() {
        let mut store = ReminderStore::new();
        store.add("second-due", 2, owner(), now());
        store.add("first-due", 1, owner(), now());
        let due = store.due(now() + Duration::hours(5));
        let messages: Vec<_> = due.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["second-due", "first-due"]);
    }

    #[test]
    fn test_ids_unique_for_same_instant() {
        let mut store = ReminderStore::new();
        let a = store.add("a", 1, owner(), now()).unwrap();
        let b = store.add("b", 1, owner(), now()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.to_string(), "rem-1");
    }

    #[test]
    fn test_cleanup_only_drops_sent() {
        let mut store = ReminderStore::new();
        let a = store.add("a", 0, owner(), now()).unwrap();
        store.add("b", 5, owner(), now());
        store.mark_sent(a.id, now());
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_count(), 1);

        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(a.id).is_none());
        assert_eq!(store.cleanup(), 0);
    }

    #[test]
    fn test_out_of_range_hours_are_rejected() {
        let mut store = ReminderStore::new();
        assert!(store.add("far", 10_000_000_000, owner(), now()).is_none());
        assert!(store.add("farther", i64::MAX, owner(), now()).is_none());
        assert!(store.add("ancient", i64::MIN, owner(), now()).is_none());
        assert!(store.is_empty());

        // The counter only advances for stored reminders.
        let r = store.add("ok", 1, owner(), now()).unwrap();
        assert_eq!(r.id, ReminderId(1));
    }

    #[test]
    fn test_fire_time_bounds() {
        assert_eq!(fire_time(now(), 2), Some(now() + Duration::hours(2)));
        assert_eq!(fire_time(now(), 9_007_199_254_740_991), None);
    }
}
