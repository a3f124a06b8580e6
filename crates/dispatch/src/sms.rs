//! SMS channel adapter, delivering through an HTTP SMS gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::channel::{Channel, ChannelAdapter, ChannelResult, ContactProfile, Message};
use crate::dispatcher::DispatchConfig;

/// Per-request timeout for the SMS gateway.
const SMS_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends "subject\nbody" as a single SMS text.
///
/// Requires an API key; without one the channel reports `Unavailable` and no
/// network call is made. Gateway rejections surface the response body's
/// `message` field as the failure reason, falling back to "Unknown error"
/// when the body is absent or unparseable.
pub struct SmsAdapter {
    api_key: Option<String>,
    sender: String,
    api_url: String,
    client: Client,
}

impl SmsAdapter {
    pub fn new(config: &DispatchConfig, client: Client) -> Self {
        Self {
            api_key: config.sms_api_key.clone(),
            sender: config.sms_sender.clone().unwrap_or_default(),
            api_url: config.sms_api_url.clone(),
            client,
        }
    }

    /// Outbound request body. Pure: identical inputs build identical JSON.
    pub fn payload(&self, contact: &ContactProfile, message: &Message) -> Value {
        json!({
            "sender": self.sender,
            "text": format!("{}\n{}", message.subject, message.body),
            "recipient": contact.phone,
        })
    }
}

#[async_trait]
impl ChannelAdapter for SmsAdapter {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn attempt(&self, contact: &ContactProfile, message: &Message) -> ChannelResult {
        let Some(api_key) = &self.api_key else {
            return ChannelResult::Unavailable;
        };
        if contact.phone.is_empty() {
            return ChannelResult::Unavailable;
        }

        let payload = self.payload(contact, message);

        match self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .timeout(SMS_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                tracing::debug!(recipient = %contact.phone, "SMS accepted by gateway");
                ChannelResult::Delivered
            }
            Ok(resp) => {
                let status = resp.status();
                let reason = resp
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|body| {
                        body.get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "Unknown error".to_string());
                tracing::warn!(%status, %reason, "SMS gateway rejected message");
                ChannelResult::Failed(reason)
            }
            Err(e) => {
                tracing::warn!(error = %e, "SMS delivery failed");
                ChannelResult::Failed(e.to_string())
            }
        }
    }
}
