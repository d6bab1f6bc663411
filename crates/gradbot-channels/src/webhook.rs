//! Discord channel webhook. Posts into a server channel and mentions the
//! recipient, for setups where the bot cannot DM the user.

use std::time::Duration;

use async_trait::async_trait;

use gradbot_core::error::{GradBotError, Result};
use gradbot_core::traits::Notifier;
use gradbot_core::types::{Notification, UserId};

use crate::embed;

pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    fn name(&self) -> &str {
        "discord-webhook"
    }

    async fn send_to_user(&self, user: &UserId, notification: &Notification) -> Result<()> {
        let mut payload = embed::message_payload(notification);
        if !user.is_empty() {
            payload["content"] = serde_json::json!(format!("<@{user}>"));
        }

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| GradBotError::Channel(format!("Discord send failed: {e}")))?;

        if resp.status().is_success() {
            tracing::info!("✅ Discord webhook notification sent: {}", notification.title);
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(GradBotError::Channel(format!("Discord webhook error {status}: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradbot_core::NotificationKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_webhook_mentions_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({"content": "<@42>", "embeds": [{"title": "hi"}]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let hook = DiscordWebhook::new(&format!("{}/hook", server.uri()));
        let n = Notification::new(NotificationKind::Info, "hi", "there", Utc::now());
        hook.send_to_user(&UserId::new("42"), &n).await.unwrap();
    }

    #[tokio::test]
    async fn test_webhook_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let hook = DiscordWebhook::new(&server.uri());
        let n = Notification::new(NotificationKind::Info, "hi", "there", Utc::now());
        assert!(hook.send_to_user(&UserId::new("42"), &n).await.is_err());
    }
}
