//! LINE webhook payload types: `{ "destination": ..., "events": [...] }`.
//!
//! Events and message contents are tagged by `type`. Only the shapes needed to
//! echo text are modelled in detail; anything unrecognized parses to `Other`.

use serde::Deserialize;

/// Webhook request body.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Bot user id the events were sent to.
    #[serde(default)]
    pub destination: Option<String>,
    /// Raw events; decoded one by one so a single odd event does not drop the batch.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

/// One webhook event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    Follow(FollowEvent),
    Unfollow(UnfollowEvent),
    Postback(PostbackEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent when the channel is in standby mode or the event is a redelivery.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: MessageContent,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowEvent {
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    pub postback: Postback,
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Postback {
    pub data: String,
}

/// Where the event came from (user, group, or room).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Message content carried by a message event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text(TextContent),
    Image(ContentMeta),
    Video(ContentMeta),
    Audio(ContentMeta),
    File(ContentMeta),
    Location(ContentMeta),
    Sticker(ContentMeta),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

/// Non-text content: only the message id is kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentMeta {
    #[serde(default)]
    pub id: Option<String>,
}

/// Parse a verified callback body into events, in payload order.
///
/// Fails only when the body is not a webhook object. Individual events that do
/// not decode are skipped with a warning.
pub fn parse_events(body: &[u8]) -> Result<Vec<WebhookEvent>, serde_json::Error> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    if let Some(ref dest) = payload.destination {
        log::debug!("webhook destination: {}", dest);
    }
    let events = payload
        .events
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| match serde_json::from_value::<WebhookEvent>(raw) {
            Ok(ev) => Some(ev),
            Err(e) => {
                log::warn!("skipping undecodable webhook event #{}: {}", i, e);
                None
            }
        })
        .collect();
    Ok(events)
}
