//! Notification history: what the bot tried to send, and whether it landed.
//! Lightweight: in-memory ring buffer, nothing persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gradbot_core::{Notification, NotificationKind};

const MAX_HISTORY: usize = 100;

/// Outcome of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Delivered,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifyRecord {
    pub kind: NotificationKind,
    pub title: String,
    /// Name of the notifier that handled it.
    pub channel: String,
    pub delivery: Delivery,
    pub timestamp: DateTime<Utc>,
}

/// Last 100 send attempts, oldest first.
#[derive(Debug, Default)]
pub struct NotifyHistory {
    records: Vec<NotifyRecord>,
    delivered: u64,
    failed: u64,
}

impl NotifyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, notification: &Notification, channel: &str, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Failed { .. } => self.failed += 1,
        }
        self.records.push(NotifyRecord {
            kind: notification.kind.clone(),
            title: notification.title.clone(),
            channel: channel.to_string(),
            delivery,
            timestamp: notification.timestamp,
        });
        // Ring buffer: keep last 100
        if self.records.len() > MAX_HISTORY {
            self.records.remove(0);
        }
    }

    pub fn records(&self) -> &[NotifyRecord] {
        &self.records
    }

    /// Lifetime totals, not capped by the ring buffer.
    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }

    pub fn failed_count(&self) -> u64 {
        self.failed
    }
}
