//! Domain types shared between the scheduler, the channels and the gateway.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Opaque chat recipient identifier (a Discord user snowflake in practice).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A school holiday, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HolidayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    DailySummary,
    Milestone { days: i64 },
    Reminder,
    StudyComplete { minutes: u32 },
    Info,
}

impl NotificationKind {
    /// Embed colour for this kind of message.
    pub fn color(&self) -> u32 {
        match self {
            NotificationKind::DailySummary => 0x00AE86,
            NotificationKind::Milestone { .. } => 0xFF6B6B,
            NotificationKind::Reminder => 0xF39C12,
            NotificationKind::StudyComplete { .. } => 0x2ECC71,
            NotificationKind::Info => 0x3498DB,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::DailySummary => "daily_summary",
            NotificationKind::Milestone { .. } => "milestone",
            NotificationKind::Reminder => "reminder",
            NotificationKind::StudyComplete { .. } => "study_complete",
            NotificationKind::Info => "info",
        }
    }
}

/// A message to deliver to a user. Channels decide how to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Inline name/value pairs (rendered as embed fields on Discord).
    #[serde(default)]
    pub fields: Vec<(String, String)>,
    pub footer: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: &str, body: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            body: body.to_string(),
            fields: Vec::new(),
            footer: None,
            timestamp,
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(text.to_string());
        self
    }

    /// Plain-text rendering, used by log output and text-only channels.
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n{}", self.title, self.body);
        for (name, value) in &self.fields {
            out.push_str(&format!("\n{name}: {value}"));
        }
        if let Some(footer) = &self.footer {
            out.push_str(&format!("\n{footer}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_bounds_inclusive() {
        let range = HolidayRange::new(
            NaiveDate::from_ymd_opt(2024, 12, 16).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 1, 28).unwrap()));
    }

    #[test]
    fn test_plain_text_includes_fields() {
        let n = Notification::new(NotificationKind::Info, "Hi", "there", Utc::now())
            .field("Days", "12")
            .footer("bye");
        let text = n.to_plain_text();
        assert!(text.starts_with("Hi\nthere"));
        assert!(text.contains("Days: 12"));
        assert!(text.ends_with("bye"));
    }

    #[test]
    fn test_user_id_serializes_as_string() {
        let json = serde_json::to_string(&UserId::new("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
