//! Discord channel: direct messages and slash-command registration over the
//! REST API (`Authorization: Bot <token>`).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use gradbot_core::error::{GradBotError, Result};
use gradbot_core::traits::Notifier;
use gradbot_core::types::{Notification, UserId};

use crate::embed;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Application {
    id: String,
}

/// Sends notifications as DMs from the bot account.
pub struct DiscordChannel {
    token: String,
    api_base: String,
    client: reqwest::Client,
    /// user id → DM channel id
    dm_channels: Mutex<HashMap<UserId, String>>,
}

impl DiscordChannel {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    pub fn with_base_url(token: &str, api_base: &str) -> Self {
        Self {
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            dm_channels: Mutex::new(HashMap::new()),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .header("Authorization", format!("Bot {}", self.token))
            .timeout(REQUEST_TIMEOUT)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(GradBotError::Channel(format!("Discord {what} error {status}: {body}")))
        }
    }

    /// DM channel for `user`, opened on first use and cached.
    pub async fn dm_channel(&self, user: &UserId) -> Result<String> {
        if let Some(id) = self.dm_channels.lock().await.get(user) {
            return Ok(id.clone());
        }

        let resp = self
            .request(reqwest::Method::POST, "/users/@me/channels")
            .json(&serde_json::json!({ "recipient_id": user.as_str() }))
            .send()
            .await
            .map_err(|e| GradBotError::Channel(format!("Discord open DM failed: {e}")))?;
        let channel: DmChannel = Self::check(resp, "open DM")
            .await?
            .json()
            .await
            .map_err(|e| GradBotError::Channel(format!("Invalid Discord DM response: {e}")))?;

        tracing::debug!("📬 Opened DM channel {} for {}", channel.id, user);
        self.dm_channels
            .lock()
            .await
            .insert(user.clone(), channel.id.clone());
        Ok(channel.id)
    }

    /// `GET /applications/@me`, for when no application id is configured.
    pub async fn application_id(&self) -> Result<String> {
        let resp = self
            .request(reqwest::Method::GET, "/applications/@me")
            .send()
            .await
            .map_err(|e| GradBotError::Channel(format!("Discord application lookup failed: {e}")))?;
        let app: Application = Self::check(resp, "application lookup")
            .await?
            .json()
            .await
            .map_err(|e| GradBotError::Channel(format!("Invalid Discord application response: {e}")))?;
        Ok(app.id)
    }

    /// Overwrite the application's global slash commands. Returns how many
    /// were registered.
    pub async fn register_commands(&self, application_id: &str) -> Result<usize> {
        let definitions = embed::command_definitions();
        let count = definitions.as_array().map_or(0, Vec::len);

        let resp = self
            .request(
                reqwest::Method::PUT,
                &format!("/applications/{application_id}/commands"),
            )
            .json(&definitions)
            .send()
            .await
            .map_err(|e| GradBotError::Channel(format!("Discord command registration failed: {e}")))?;
        Self::check(resp, "command registration").await?;

        tracing::info!("✅ Registered {count} slash commands");
        Ok(count)
    }
}

#[async_trait]
impl Notifier for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send_to_user(&self, user: &UserId, notification: &Notification) -> Result<()> {
        let channel_id = self.dm_channel(user).await?;
        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/channels/{channel_id}/messages"),
            )
            .json(&embed::message_payload(notification))
            .send()
            .await
            .map_err(|e| GradBotError::Channel(format!("Discord send failed: {e}")))?;
        Self::check(resp, "send").await?;

        tracing::info!("✅ Discord notification sent: {}", notification.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradbot_core::NotificationKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn note() -> Notification {
        Notification::new(NotificationKind::Reminder, "⏰ Reminder!", "revise", Utc::now())
    }

    #[tokio::test]
    async fn test_send_opens_dm_once_and_posts_embed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/@me/channels"))
            .and(header("Authorization", "Bot test-token"))
            .and(body_partial_json(json!({"recipient_id": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dm-1"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/channels/dm-1/messages"))
            .and(body_partial_json(json!({"embeds": [{"title": "⏰ Reminder!", "description": "revise"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m"})))
            .expect(2)
            .mount(&server)
            .await;

        let discord = DiscordChannel::with_base_url("test-token", &server.uri());
        let user = UserId::new("42");
        discord.send_to_user(&user, &note()).await.unwrap();
        discord.send_to_user(&user, &note()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_error_maps_to_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/@me/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Cannot send messages to this user"))
            .mount(&server)
            .await;

        let discord = DiscordChannel::with_base_url("t", &server.uri());
        let err = discord
            .send_to_user(&UserId::new("42"), &note())
            .await
            .unwrap_err();
        match err {
            GradBotError::Channel(msg) => assert!(msg.contains("403")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_register_commands() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/applications/@me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "app-9"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/applications/app-9/commands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let discord = DiscordChannel::with_base_url("t", &server.uri());
        let app = discord.application_id().await.unwrap();
        assert_eq!(app, "app-9");
        assert_eq!(discord.register_commands(&app).await.unwrap(), 8);
    }
}
