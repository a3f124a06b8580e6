//! Telegram channel adapter, delivering through the Bot API `sendMessage` call.

use async_trait::async_trait;
use reqwest::Client;

use crate::channel::{Channel, ChannelAdapter, ChannelResult, ContactProfile, Message};
use crate::dispatcher::DispatchConfig;

/// Sends "*subject*\nbody" (Markdown-emphasized subject) to the recipient's
/// chat. Requires a bot token; without one the channel reports `Unavailable`
/// and no network call is made. The token is embedded in the URL path, the
/// message travels as query parameters.
pub struct TelegramAdapter {
    bot_token: Option<String>,
    api_url: String,
    client: Client,
}

impl TelegramAdapter {
    pub fn new(config: &DispatchConfig, client: Client) -> Self {
        Self {
            bot_token: config.telegram_bot_token.clone(),
            api_url: config.telegram_api_url.clone(),
            client,
        }
    }

    /// Outbound query parameters. Pure: identical inputs build identical pairs.
    pub fn payload(&self, contact: &ContactProfile, message: &Message) -> Vec<(&'static str, String)> {
        vec![
            ("chat_id", contact.telegram_chat_id.clone()),
            ("text", format!("*{}*\n{}", message.subject, message.body)),
        ]
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    async fn attempt(&self, contact: &ContactProfile, message: &Message) -> ChannelResult {
        let Some(token) = &self.bot_token else {
            return ChannelResult::Unavailable;
        };
        if contact.telegram_chat_id.is_empty() {
            return ChannelResult::Unavailable;
        }

        let url = format!("{}{}/sendMessage", self.api_url, token);
        let params = self.payload(contact, message);

        match self.client.post(&url).query(&params).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(chat_id = %contact.telegram_chat_id, "Telegram message accepted");
                ChannelResult::Delivered
            }
            Ok(resp) => {
                let status = resp.status();
                tracing::warn!(%status, "Telegram Bot API rejected message");
                ChannelResult::Failed(format!("Telegram Bot API returned {status}"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Telegram delivery failed");
                ChannelResult::Failed(e.to_string())
            }
        }
    }
}
