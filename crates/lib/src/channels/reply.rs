//! Outbound reply seam: the dispatcher only needs "reply to token with text".

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("reply api error: {0}")]
    Api(String),
}

/// Sends a text reply correlated to an inbound event's reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `text` as the single reply for `reply_token`. No retries.
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), ReplyError>;
}
