//! Study session tracker (pomodoro-style timers).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use gradbot_core::UserId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySession {
    pub id: u64,
    pub duration_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub owner_id: UserId,
    pub completed: bool,
    pub actual_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct StudyTracker {
    sessions: Vec<StudySession>,
    next_id: u64,
}

impl StudyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, duration_minutes: u32, owner: UserId, now: DateTime<Utc>) -> StudySession {
        self.next_id += 1;
        let session = StudySession {
            id: self.next_id,
            duration_minutes,
            start_time: now,
            end_time: now + Duration::minutes(i64::from(duration_minutes)),
            owner_id: owner,
            completed: false,
            actual_end_time: None,
        };
        self.sessions.push(session.clone());
        session
    }

    pub fn complete(&mut self, id: u64, now: DateTime<Utc>) -> Option<StudySession> {
        let session = self.sessions.iter_mut().find(|s| s.id == id)?;
        session.completed = true;
        session.actual_end_time = Some(now);
        Some(session.clone())
    }

    pub fn all(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn completed_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.completed).count()
    }

    /// Planned minutes across all sessions, finished or not.
    pub fn total_minutes(&self) -> u64 {
        self.sessions.iter().map(|s| u64::from(s.duration_minutes)).sum()
    }

    pub fn average_minutes(&self) -> u64 {
        if self.sessions.is_empty() {
            return 0;
        }
        (self.total_minutes() as f64 / self.sessions.len() as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_computes_end_time() {
        let mut tracker = StudyTracker::new();
        let now = Utc::now();
        let s = tracker.start(25, UserId::new("1"), now);
        assert_eq!(s.end_time - s.start_time, Duration::minutes(25));
        assert!(!s.completed);
    }

    #[test]
    fn test_complete_and_totals() {
        let mut tracker = StudyTracker::new();
        let now = Utc::now();
        let a = tracker.start(25, UserId::new("1"), now);
        tracker.start(50, UserId::new("1"), now);
        tracker.start(30, UserId::new("1"), now);

        let done = tracker.complete(a.id, now + Duration::minutes(25)).unwrap();
        assert!(done.completed);
        assert!(done.actual_end_time.is_some());
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.total_minutes(), 105);
        assert_eq!(tracker.average_minutes(), 35);
        assert!(tracker.complete(42, now).is_none());
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(StudyTracker::new().average_minutes(), 0);
    }
}
