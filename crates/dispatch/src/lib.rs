//! Channel-fallback delivery engine.
//!
//! A [`Dispatcher`] takes a recipient's [`ContactProfile`] and a [`Message`]
//! and walks a fixed ordered list of channel adapters (email, SMS, Telegram),
//! returning the first successful delivery or an aggregate failure. Each
//! adapter converts its own transport errors into a structured
//! [`ChannelResult`] so the fallback loop never has to know which transport
//! it is talking to.
//!
//! Delivery semantics in one paragraph: a channel that is not configured is
//! skipped silently; a channel that was actually tried and failed records its
//! failure reason. If every channel was merely unavailable the dispatch
//! resolves to a non-error [`DispatchOutcome::NotSent`]; if at least one
//! channel was tried and failed, the whole dispatch fails with the LAST
//! failure reason. Each channel is attempted at most once per call — this is
//! not a queue and not a retry system.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod sms;
pub mod telegram;

pub use channel::{Channel, ChannelAdapter, ChannelResult, ContactProfile, Message};
pub use dispatcher::{DispatchConfig, DispatchError, DispatchOutcome, Dispatcher, http_client};
pub use email::EmailAdapter;
pub use sms::SmsAdapter;
pub use telegram::TelegramAdapter;
