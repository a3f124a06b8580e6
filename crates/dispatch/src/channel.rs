//! Channel adapter contract and the value types shared by all adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A recipient's contact details, immutable for the duration of a dispatch.
///
/// An empty field makes the corresponding channel unavailable; the dispatcher
/// does not validate the profile beyond that (the API layer enforces
/// non-empty fields before a profile is ever persisted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactProfile {
    pub email: String,
    pub phone: String,
    pub telegram_chat_id: String,
}

/// The message to deliver, constructed once per dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// One delivery mechanism, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Telegram,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Sms => write!(f, "sms"),
            Channel::Telegram => write!(f, "telegram"),
        }
    }
}

/// Outcome of a single channel attempt.
///
/// Adapters never propagate transport errors; every failure mode is folded
/// into one of these three variants at the adapter boundary so the fallback
/// loop stays transport-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelResult {
    /// The transport accepted the message (no delivery-receipt confirmation).
    Delivered,
    /// The channel is not configured for this recipient; skipped silently.
    Unavailable,
    /// The channel was tried and the transport rejected or errored.
    Failed(String),
}

/// A delivery channel bound to its configuration and HTTP client.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The channel identity reported on success.
    fn channel(&self) -> Channel;

    /// Try to deliver `message` to `contact` exactly once.
    async fn attempt(&self, contact: &ContactProfile, message: &Message) -> ChannelResult;
}
