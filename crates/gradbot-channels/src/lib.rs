//! # GradBot Channels
//! Where notifications go.
//!
//! - `discord`: direct messages through the Discord REST API, plus slash-command registration
//! - `webhook`: a Discord channel webhook
//! - `log`: writes to the tracing log (dry runs)

pub mod discord;
pub mod embed;
pub mod log;
pub mod webhook;

pub use discord::DiscordChannel;
pub use log::LogNotifier;
pub use webhook::DiscordWebhook;
