//! Adapter-level delivery tests against a mock HTTP server.
//!
//! Covers status-code mapping per channel, the unavailable short-circuits,
//! payload determinism, and the dispatcher's fallback over real adapters.

use mockito::{Matcher, Server};
use serde_json::json;

use herald_dispatch::channel::{ChannelAdapter, ChannelResult, ContactProfile, Message};
use herald_dispatch::{
    Channel, DispatchConfig, DispatchOutcome, Dispatcher, EmailAdapter, SmsAdapter,
    TelegramAdapter, http_client,
};

// ============================================================
// Helpers
// ============================================================

fn contact() -> ContactProfile {
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

/// Channel config with every credential set, pointing at the mock server.
fn config_for(server: &Server) -> DispatchConfig {
    DispatchConfig {
        email_from: Some("noreply@herald.dev".to_string()),
        email_api_key: Some("email-key".to_string()),
        email_api_url: format!("{}/emails", server.url()),
        sms_api_key: Some("sms-key".to_string()),
        sms_sender: Some("Herald".to_string()),
        sms_api_url: format!("{}/sms", server.url()),
        telegram_bot_token: Some("123456:token".to_string()),
        telegram_api_url: format!("{}/bot", server.url()),
    }
}

// ============================================================
// SMS status mapping
// ============================================================

#[tokio::test]
async fn sms_http_200_is_delivered() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/sms")
        .match_header("authorization", "Bearer sms-key")
        .match_body(Matcher::Json(json!({
            "sender": "Herald",
            "text": "Reminder\nYour report is due",
            "recipient": "+79991234567",
        })))
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let adapter = SmsAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Delivered);
    mock.assert_async().await;
}

#[tokio::test]
async fn sms_error_body_message_becomes_the_reason() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/sms")
        .with_status(403)
        .with_body(r#"{"message":"invalid key"}"#)
        .create_async()
        .await;

    let adapter = SmsAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Failed("invalid key".to_string()));
}

#[tokio::test]
async fn sms_unparseable_error_body_maps_to_unknown_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/sms")
        .with_status(500)
        .with_body("gateway exploded")
        .create_async()
        .await;

    let adapter = SmsAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Failed("Unknown error".to_string()));
}

#[tokio::test]
async fn sms_without_api_key_is_unavailable_without_a_network_call() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/sms")
        .expect(0)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.sms_api_key = None;

    let adapter = SmsAdapter::new(&config, http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Unavailable);
    mock.assert_async().await;
}

// ============================================================
// Email
// ============================================================

#[tokio::test]
async fn email_acceptance_is_delivered() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/emails")
        .match_header("authorization", "Bearer email-key")
        .match_body(Matcher::Json(json!({
            "from": "noreply@herald.dev",
            "to": ["user@example.com"],
            "subject": "Reminder",
            "text": "Your report is due",
        })))
        .with_status(200)
        .with_body(r#"{"id":"msg_1"}"#)
        .create_async()
        .await;

    let adapter = EmailAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Delivered);
    mock.assert_async().await;
}

#[tokio::test]
async fn email_rejection_is_failed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/emails")
        .with_status(422)
        .with_body(r#"{"message":"invalid from address"}"#)
        .create_async()
        .await;

    let adapter = EmailAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    match result {
        ChannelResult::Failed(reason) => assert!(reason.contains("422")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn email_with_missing_credentials_is_still_attempted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/emails")
        .with_status(401)
        .with_body(r#"{"message":"missing api key"}"#)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.email_api_key = None;
    config.email_from = None;

    let adapter = EmailAdapter::new(&config, http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    // The transport decides: the request goes out and the rejection becomes
    // a Failed, not an Unavailable.
    assert!(matches!(result, ChannelResult::Failed(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn email_with_empty_recipient_is_unavailable() {
    let server = Server::new_async().await;

    let adapter = EmailAdapter::new(&config_for(&server), http_client().unwrap());
    let mut recipient = contact();
    recipient.email.clear();

    let result = adapter.attempt(&recipient, &message()).await;
    assert_eq!(result, ChannelResult::Unavailable);
}

// ============================================================
// Telegram
// ============================================================

#[tokio::test]
async fn telegram_sends_markdown_subject_to_the_chat() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/bot123456:token/sendMessage")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("chat_id".into(), "123456".into()),
            Matcher::UrlEncoded("text".into(), "*Reminder*\nYour report is due".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create_async()
        .await;

    let adapter = TelegramAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Delivered);
    mock.assert_async().await;
}

#[tokio::test]
async fn telegram_rejection_is_failed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/bot123456:token/sendMessage")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let adapter = TelegramAdapter::new(&config_for(&server), http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    match result {
        ChannelResult::Failed(reason) => assert!(reason.contains("400")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn telegram_without_token_is_unavailable() {
    let server = Server::new_async().await;

    let mut config = config_for(&server);
    config.telegram_bot_token = None;

    let adapter = TelegramAdapter::new(&config, http_client().unwrap());
    let result = adapter.attempt(&contact(), &message()).await;

    assert_eq!(result, ChannelResult::Unavailable);
}

// ============================================================
// Payload determinism
// ============================================================

#[tokio::test]
async fn payload_construction_is_idempotent() {
    let server = Server::new_async().await;
    let config = config_for(&server);
    let client = http_client().unwrap();

    let email = EmailAdapter::new(&config, client.clone());
    let sms = SmsAdapter::new(&config, client.clone());
    let telegram = TelegramAdapter::new(&config, client);

    let (c, m) = (contact(), message());

    let email_first = serde_json::to_vec(&email.payload(&c, &m)).unwrap();
    let email_second = serde_json::to_vec(&email.payload(&c, &m)).unwrap();
    assert_eq!(email_first, email_second);

    let sms_first = serde_json::to_vec(&sms.payload(&c, &m)).unwrap();
    let sms_second = serde_json::to_vec(&sms.payload(&c, &m)).unwrap();
    assert_eq!(sms_first, sms_second);

    assert_eq!(telegram.payload(&c, &m), telegram.payload(&c, &m));
}

// ============================================================
// Fallback over real adapters
// ============================================================

#[tokio::test]
async fn dispatcher_falls_back_from_email_to_sms() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/emails")
        .with_status(500)
        .with_body(r#"{"message":"smtp upstream down"}"#)
        .create_async()
        .await;
    let sms_mock = server
        .mock("POST", "/sms")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;
    let telegram_mock = server
        .mock("POST", "/bot123456:token/sendMessage")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dispatcher = Dispatcher::new(
        Some(contact()),
        &config_for(&server),
        http_client().unwrap(),
    )
    .unwrap();

    let outcome = dispatcher.dispatch(&message()).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Sent(Channel::Sms));
    sms_mock.assert_async().await;
    telegram_mock.assert_async().await;
}
