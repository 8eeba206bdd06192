//! LINE Messaging API client: reply with text via `POST /v2/bot/message/reply`.

use crate::channels::reply::{ReplyError, ReplySender};
use crate::config::DEFAULT_LINE_API_BASE;
use async_trait::async_trait;
use serde::Serialize;

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Reply request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<OutboundMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage<'a> {
    Text { text: &'a str },
}

/// Client for the LINE reply API, authorized by the channel access token.
#[derive(Clone)]
pub struct LineClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(access_token: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string());
        Self {
            base_url,
            access_token: access_token.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /v2/bot/message/reply with a single text message.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), ReplyError> {
        let url = format!("{}{}", self.base_url, REPLY_PATH);
        let body = ReplyRequest {
            reply_token,
            messages: vec![OutboundMessage::Text { text }],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ReplyError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), ReplyError> {
        self.reply_text(reply_token, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_request_wire_format() {
        let body = ReplyRequest {
            reply_token: "tok123",
            messages: vec![OutboundMessage::Text { text: "hello" }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "replyToken": "tok123",
                "messages": [{"type": "text", "text": "hello"}]
            })
        );
    }

    #[test]
    fn base_url_default_and_trailing_slash() {
        assert_eq!(LineClient::new("t", None).base_url(), "https://api.line.me");
        assert_eq!(
            LineClient::new("t", Some("http://127.0.0.1:9/".to_string())).base_url(),
            "http://127.0.0.1:9"
        );
    }
}
