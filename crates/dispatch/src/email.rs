//! Email channel adapter, delivering through a transactional mail HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::channel::{Channel, ChannelAdapter, ChannelResult, ContactProfile, Message};
use crate::dispatcher::DispatchConfig;

/// Sends subject + body verbatim through the configured mail API.
///
/// Unlike the SMS and Telegram adapters, a missing sender address or API key
/// does not make the channel unavailable: the request is issued anyway and
/// the mail API's rejection becomes a `Failed` result. Only an empty
/// recipient address short-circuits.
pub struct EmailAdapter {
    from: String,
    api_key: String,
    api_url: String,
    client: Client,
}

impl EmailAdapter {
    pub fn new(config: &DispatchConfig, client: Client) -> Self {
        Self {
            from: config.email_from.clone().unwrap_or_default(),
            api_key: config.email_api_key.clone().unwrap_or_default(),
            api_url: config.email_api_url.clone(),
            client,
        }
    }

    /// Outbound request body. Pure: identical inputs build identical JSON.
    pub fn payload(&self, contact: &ContactProfile, message: &Message) -> Value {
        json!({
            "from": self.from,
            "to": [contact.email],
            "subject": message.subject,
            "text": message.body,
        })
    }
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn attempt(&self, contact: &ContactProfile, message: &Message) -> ChannelResult {
        if contact.email.is_empty() {
            return ChannelResult::Unavailable;
        }

        let payload = self.payload(contact, message);

        match self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(to = %contact.email, "Email accepted by mail API");
                ChannelResult::Delivered
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                tracing::warn!(%status, "Email delivery rejected");
                ChannelResult::Failed(format!("mail API returned {status}: {detail}"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Email delivery failed");
                ChannelResult::Failed(e.to_string())
            }
        }
    }
}
