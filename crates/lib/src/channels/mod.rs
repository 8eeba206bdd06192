//! LINE channel: webhook payload types, the reply seam, and the API client.

mod line;
mod reply;
mod webhook;

pub use line::{LineClient, OutboundMessage, ReplyRequest};
pub use reply::{ReplyError, ReplySender};
pub use webhook::{
    parse_events, ContentMeta, FollowEvent, MessageContent, MessageEvent, Postback, PostbackEvent,
    Source, TextContent, UnfollowEvent, WebhookEvent, WebhookPayload,
};
