//! Shared fixtures for the scheduler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};

use gradbot_core::{GradBotError, Notification, NotificationKind, Notifier, Result, UserId};

use crate::calendar::GraduationCalendar;

/// Records every send; fails for recipients in `fail_for`.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(UserId, Notification)>>,
    pub fail_for: Vec<String>,
}

impl RecordingNotifier {
    pub fn failing_for(user: &str) -> Self {
        Self {
            fail_for: vec![user.to_string()],
            ..Default::default()
        }
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, n)| n.kind.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send_to_user(&self, user: &UserId, notification: &Notification) -> Result<()> {
        tokio::task::yield_now().await;
        if self.fail_for.iter().any(|u| u == user.as_str()) {
            return Err(GradBotError::Channel("recipient unreachable".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((user.clone(), notification.clone()));
        Ok(())
    }
}

/// Graduation on 2025-11-21, evaluated in UTC, no holidays.
pub fn utc_calendar() -> GraduationCalendar {
    GraduationCalendar::new(
        NaiveDate::from_ymd_opt(2025, 11, 21).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        FixedOffset::east_opt(0).unwrap(),
        vec![],
    )
}
