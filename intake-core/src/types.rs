//! Core types: inbound message, attachment reference, finalized order, handler response, and Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference to an image sent in a chat. Carries what the media-download collaborator
/// needs to fetch the bytes later; never the bytes themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Transport message id that carried the image.
    pub message_id: String,
    /// Transport instance (e.g. the WhatsApp gateway instance name) the message arrived on.
    pub instance: Option<String>,
    pub caption: Option<String>,
    pub mime_type: Option<String>,
}

impl Attachment {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            instance: None,
            caption: None,
            mime_type: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// A single inbound chat message, already stripped of its transport envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    /// Conversation key (group or private chat id).
    pub chat_id: String,
    /// Display name of the sender.
    pub author_name: String,
    /// Plain text body (message text or media caption); may be empty.
    pub text: String,
    /// Present when the message carries an image.
    pub attachment: Option<Attachment>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Text-only message received now.
    pub fn text(chat_id: impl Into<String>, author_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            chat_id: chat_id.into(),
            author_name: author_name.into(),
            text: text.into(),
            attachment: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn has_image(&self) -> bool {
        self.attachment.is_some()
    }

    /// Trimmed text, `None` when blank.
    pub fn trimmed_text(&self) -> Option<&str> {
        let t = self.text.trim();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }
}

/// Immutable snapshot produced when a conversation finishes. Handed to an [`OrderSink`](crate::OrderSink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedOrder {
    pub chat_id: String,
    pub author_name: String,
    pub title: String,
    pub fragments: Vec<String>,
    pub attachments: Vec<Attachment>,
    /// Delivery instant in the operator's local offset; noon when no time of day was given.
    pub delivery_date: Option<DateTime<FixedOffset>>,
    /// The whole user reply the delivery date was resolved from, as typed.
    pub delivery_date_text: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finalized_at: DateTime<Utc>,
}

impl FinalizedOrder {
    /// Fragments joined with newlines, in the order they were received.
    pub fn description(&self) -> String {
        self.fragments.join("\n")
    }
}

/// Handler result for the chain. `Reply(text)` carries the response body so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain and attach the reply text that was sent.
    Reply(String),
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &InboundMessage) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &InboundMessage) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &InboundMessage,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
