//! Shared helpers for integration tests: a recording reply sender and a server on a free port.

#![allow(dead_code)]

use async_trait::async_trait;
use lib::channels::{ReplyError, ReplySender};
use lib::config::Credentials;
use lib::gateway::{self, GatewayState};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const CHANNEL_SECRET: &str = "test-channel-secret";

/// Records every reply in call order. Tokens in `fail_tokens` return an API error.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_tokens: Vec<String>,
}

#[async_trait]
impl ReplySender for RecordingSender {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), ReplyError> {
        if self.fail_tokens.iter().any(|t| t == reply_token) {
            return Err(ReplyError::Api("429 Too Many Requests".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }
}

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Serve the relay router with `sender` on an ephemeral port. Returns the base URL.
/// The server task is left running when the test ends.
pub async fn spawn_relay(sender: Arc<RecordingSender>) -> String {
    let credentials =
        Credentials::from_parts(Some(ACCESS_TOKEN.into()), Some(CHANNEL_SECRET.into()))
            .expect("credentials");
    let state = GatewayState::new(credentials, sender);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind relay");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, gateway::router(state)).await;
    });
    format!("http://{}", addr)
}

pub fn text_event(token: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "replyToken": token,
        "message": {"type": "text", "text": text}
    })
}

pub fn body_of(events: Vec<serde_json::Value>) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "destination": "Uxxxxxxxx", "events": events }))
        .expect("serialize body")
}
