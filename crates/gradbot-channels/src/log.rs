//! Log-only notifier for `--dry-run`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use gradbot_core::error::Result;
use gradbot_core::traits::Notifier;
use gradbot_core::types::{Notification, UserId};

#[derive(Debug, Default)]
pub struct LogNotifier {
    sent: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_to_user(&self, user: &UserId, notification: &Notification) -> Result<()> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            "📨 [dry-run] → {user} [{}]\n{}",
            notification.kind.label(),
            notification.to_plain_text()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradbot_core::NotificationKind;

    #[tokio::test]
    async fn test_log_notifier_counts() {
        let log = LogNotifier::new();
        let n = Notification::new(NotificationKind::Info, "t", "b", Utc::now());
        log.send_to_user(&UserId::new("1"), &n).await.unwrap();
        log.send_to_user(&UserId::new("1"), &n).await.unwrap();
        assert_eq!(log.sent_count(), 2);
    }
}
