//! Handlers for logging and the allowed-chat filter.

use async_trait::async_trait;
use intake_core::{Handler, HandlerResponse, InboundMessage, Result};
use tracing::{debug, info, instrument};

/// Logs each message in before() and the response in after(); always continues.
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        info!(
            chat_id = %message.chat_id,
            author = %message.author_name,
            has_image = message.has_image(),
            text = %message.text,
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &InboundMessage, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = %message.id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}

/// Stops the chain for chats whose id does not contain the configured fragment
/// (WHATSAPP_GROUP_ID). With no fragment every chat passes.
pub struct AllowedChatHandler {
    fragment: Option<String>,
}

impl AllowedChatHandler {
    pub fn new(fragment: Option<String>) -> Self {
        Self {
            fragment: fragment.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
        }
    }

    pub fn allows(&self, chat_id: &str) -> bool {
        match &self.fragment {
            Some(fragment) => chat_id.contains(fragment.as_str()),
            None => true,
        }
    }
}

#[async_trait]
impl Handler for AllowedChatHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &InboundMessage) -> Result<bool> {
        if self.allows(&message.chat_id) {
            Ok(true)
        } else {
            info!(chat_id = %message.chat_id, "Message not from the configured chat, ignored");
            Ok(false)
        }
    }
}
