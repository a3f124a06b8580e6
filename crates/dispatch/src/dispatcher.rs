//! The fallback loop: try each channel in priority order, stop on the first
//! success, aggregate the failures.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use herald_common::config::AppConfig;

use crate::channel::{Channel, ChannelAdapter, ChannelResult, ContactProfile, Message};
use crate::email::EmailAdapter;
use crate::sms::SmsAdapter;
use crate::telegram::TelegramAdapter;

/// Uniform timeout applied to every outbound channel call via the shared
/// HTTP client.
const CHANNEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel settings for one dispatcher.
///
/// Each credential is optional; an absent credential makes the corresponding
/// channel unavailable at construction time rather than at call time.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    pub email_from: Option<String>,
    pub email_api_key: Option<String>,
    pub email_api_url: String,
    pub sms_api_key: Option<String>,
    pub sms_sender: Option<String>,
    pub sms_api_url: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
}

impl DispatchConfig {
    /// Extract the channel settings from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            email_from: config.email_from.clone(),
            email_api_key: config.email_api_key.clone(),
            email_api_url: config.email_api_url.clone(),
            sms_api_key: config.sms_api_key.clone(),
            sms_sender: config.sms_sender.clone(),
            sms_api_url: config.sms_api_url.clone(),
            telegram_bot_token: config.telegram_bot_token.clone(),
            telegram_api_url: config.telegram_api_url.clone(),
        }
    }
}

/// Errors that escape the dispatcher.
///
/// Everything a single channel does wrong is folded into [`ChannelResult`];
/// only these two aggregate conditions surface to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The recipient has no contact profile at all; raised at construction,
    /// before any channel is attempted.
    #[error("User contacts are not filled in")]
    ContactsMissing,

    /// Every channel that was actually tried failed. Carries the last
    /// channel's failure reason only.
    #[error("All delivery channels failed. Last error: {0}")]
    AllChannelsFailed(String),
}

/// Aggregate result of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered through the named channel; later channels were never tried.
    Sent(Channel),
    /// Every channel was unavailable. A degraded but non-error outcome:
    /// "nothing configured" is not escalated, only "tried and failed" is.
    NotSent,
}

/// Build the shared HTTP client used by all channel adapters.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder().timeout(CHANNEL_TIMEOUT).build()
}

/// Owns the ordered adapter list and the fallback loop.
///
/// Stateless across calls; each dispatch is independent and sequential, and
/// blocks for the sum of attempt latencies up to the first success.
pub struct Dispatcher {
    contacts: ContactProfile,
    adapters: Vec<Box<dyn ChannelAdapter>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("contacts", &self.contacts)
            .field(
                "adapters",
                &self
                    .adapters
                    .iter()
                    .map(|a| a.channel())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Dispatcher {
    /// Bind a dispatcher to a recipient's resolved contact profile.
    ///
    /// `None` means the recipient never filled in their contacts, which is
    /// fatal before any channel is considered. Fallback priority is fixed:
    /// email, then SMS, then Telegram.
    pub fn new(
        contacts: Option<ContactProfile>,
        config: &DispatchConfig,
        client: Client,
    ) -> Result<Self, DispatchError> {
        let contacts = contacts.ok_or(DispatchError::ContactsMissing)?;
        let adapters: Vec<Box<dyn ChannelAdapter>> = vec![
            Box::new(EmailAdapter::new(config, client.clone())),
            Box::new(SmsAdapter::new(config, client.clone())),
            Box::new(TelegramAdapter::new(config, client)),
        ];
        Ok(Self { contacts, adapters })
    }

    #[cfg(test)]
    fn with_adapters(contacts: ContactProfile, adapters: Vec<Box<dyn ChannelAdapter>>) -> Self {
        Self { contacts, adapters }
    }

    /// Attempt delivery through each channel in order, at most once each.
    ///
    /// Returns on the first `Delivered`. `Unavailable` channels are skipped
    /// without recording an error; `Failed` channels overwrite the running
    /// last-failure reason. An exhausted loop resolves to
    /// [`DispatchOutcome::NotSent`] if nothing was ever tried, or
    /// [`DispatchError::AllChannelsFailed`] if at least one channel was.
    pub async fn dispatch(&self, message: &Message) -> Result<DispatchOutcome, DispatchError> {
        let mut last_reason: Option<String> = None;

        for adapter in &self.adapters {
            let channel = adapter.channel();
            match adapter.attempt(&self.contacts, message).await {
                ChannelResult::Delivered => {
                    tracing::info!(%channel, "Notification delivered");
                    return Ok(DispatchOutcome::Sent(channel));
                }
                ChannelResult::Unavailable => {
                    tracing::debug!(%channel, "Channel unavailable, skipping");
                }
                ChannelResult::Failed(reason) => {
                    tracing::warn!(%channel, %reason, "Channel failed, falling through");
                    last_reason = Some(reason);
                }
            }
        }

        match last_reason {
            Some(reason) => Err(DispatchError::AllChannelsFailed(reason)),
            None => {
                tracing::warn!("No delivery channel available for recipient");
                Ok(DispatchOutcome::NotSent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Adapter that returns a scripted result and counts its invocations.
    struct ScriptedAdapter {
        channel: Channel,
        result: ChannelResult,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedAdapter {
        fn boxed(channel: Channel, result: ChannelResult) -> (Box<dyn ChannelAdapter>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let adapter = Box::new(Self {
                channel,
                result,
                calls: calls.clone(),
            });
            (adapter, calls)
        }
    }

    #[async_trait]
    impl ChannelAdapter for ScriptedAdapter {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn attempt(&self, _contact: &ContactProfile, _message: &Message) -> ChannelResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn profile() -> ContactProfile {
        ContactProfile {
            email: "user@example.com".to_string(),
            phone: "+79991234567".to_string(),
            telegram_chat_id: "123456".to_string(),
        }
    }

    fn message() -> Message {
        Message {
            subject: "Reminder".to_string(),
            body: "Your report is due".to_string(),
        }
    }

    #[tokio::test]
    async fn first_success_stops_iteration() {
        let (email, email_calls) = ScriptedAdapter::boxed(Channel::Email, ChannelResult::Delivered);
        let (sms, sms_calls) = ScriptedAdapter::boxed(Channel::Sms, ChannelResult::Delivered);
        let (tg, tg_calls) = ScriptedAdapter::boxed(Channel::Telegram, ChannelResult::Delivered);

        let dispatcher = Dispatcher::with_adapters(profile(), vec![email, sms, tg]);
        let outcome = dispatcher.dispatch(&message()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent(Channel::Email));
        assert_eq!(email_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sms_calls.load(Ordering::SeqCst), 0);
        assert_eq!(tg_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_channel() {
        let (email, _) =
            ScriptedAdapter::boxed(Channel::Email, ChannelResult::Failed("smtp down".into()));
        let (sms, sms_calls) = ScriptedAdapter::boxed(Channel::Sms, ChannelResult::Delivered);
        let (tg, tg_calls) = ScriptedAdapter::boxed(Channel::Telegram, ChannelResult::Delivered);

        let dispatcher = Dispatcher::with_adapters(profile(), vec![email, sms, tg]);
        let outcome = dispatcher.dispatch(&message()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent(Channel::Sms));
        assert_eq!(sms_calls.load(Ordering::SeqCst), 1);
        assert_eq!(tg_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_unavailable_is_a_soft_failure() {
        let (email, _) = ScriptedAdapter::boxed(Channel::Email, ChannelResult::Unavailable);
        let (sms, _) = ScriptedAdapter::boxed(Channel::Sms, ChannelResult::Unavailable);
        let (tg, _) = ScriptedAdapter::boxed(Channel::Telegram, ChannelResult::Unavailable);

        let dispatcher = Dispatcher::with_adapters(profile(), vec![email, sms, tg]);
        let outcome = dispatcher.dispatch(&message()).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::NotSent);
    }

    #[tokio::test]
    async fn failed_then_unavailable_is_a_hard_failure() {
        let (email, _) =
            ScriptedAdapter::boxed(Channel::Email, ChannelResult::Failed("smtp down".into()));
        let (sms, _) = ScriptedAdapter::boxed(Channel::Sms, ChannelResult::Unavailable);
        let (tg, _) = ScriptedAdapter::boxed(Channel::Telegram, ChannelResult::Unavailable);

        let dispatcher = Dispatcher::with_adapters(profile(), vec![email, sms, tg]);
        let err = dispatcher.dispatch(&message()).await.unwrap_err();

        assert_eq!(err, DispatchError::AllChannelsFailed("smtp down".into()));
    }

    #[tokio::test]
    async fn last_failure_reason_wins() {
        let (email, _) =
            ScriptedAdapter::boxed(Channel::Email, ChannelResult::Failed("smtp down".into()));
        let (sms, _) =
            ScriptedAdapter::boxed(Channel::Sms, ChannelResult::Failed("gateway 500".into()));
        let (tg, _) = ScriptedAdapter::boxed(Channel::Telegram, ChannelResult::Unavailable);

        let dispatcher = Dispatcher::with_adapters(profile(), vec![email, sms, tg]);
        let err = dispatcher.dispatch(&message()).await.unwrap_err();

        assert_eq!(err, DispatchError::AllChannelsFailed("gateway 500".into()));
    }

    #[tokio::test]
    async fn missing_profile_fails_at_construction() {
        let client = http_client().unwrap();
        let err = Dispatcher::new(None, &DispatchConfig::default(), client).unwrap_err();
        assert_eq!(err, DispatchError::ContactsMissing);
    }
}
