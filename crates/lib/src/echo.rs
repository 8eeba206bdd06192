//! Echo dispatcher: reply to each text message with the exact text received.

use crate::channels::{MessageContent, ReplySender, WebhookEvent};
use std::sync::Arc;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Replied,
    Ignored,
    Failed(String),
}

/// Counts for one callback batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub replied: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// Dispatches verified events to the reply sender.
#[derive(Clone)]
pub struct EchoDispatcher {
    sender: Arc<dyn ReplySender>,
}

impl EchoDispatcher {
    pub fn new(sender: Arc<dyn ReplySender>) -> Self {
        Self { sender }
    }

    /// Handle one event. Text messages get exactly one reply; everything else is ignored.
    pub async fn handle(&self, event: &WebhookEvent) -> DispatchOutcome {
        let WebhookEvent::Message(msg) = event else {
            return DispatchOutcome::Ignored;
        };
        let MessageContent::Text(ref content) = msg.message else {
            return DispatchOutcome::Ignored;
        };
        let Some(ref reply_token) = msg.reply_token else {
            log::debug!("text message without reply token, not replying");
            return DispatchOutcome::Ignored;
        };
        match self.sender.send_reply(reply_token, &content.text).await {
            Ok(()) => DispatchOutcome::Replied,
            Err(e) => {
                log::error!("reply failed: {}", e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Handle events sequentially in order. A failed reply does not stop the batch.
    pub async fn dispatch_all(&self, events: &[WebhookEvent]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for event in events {
            match self.handle(event).await {
                DispatchOutcome::Replied => summary.replied += 1,
                DispatchOutcome::Ignored => summary.ignored += 1,
                DispatchOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}
