//! # Handler chain
//!
//! Runs every handler's `before` in order (any `false` stops the chain), then `handle` until one
//! returns Stop or Reply, then every `after` in reverse order with the final response.

use intake_core::{Handler, HandlerResponse, InboundMessage, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler (before/handle run in insertion order, after in reverse).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the three phases. Returns the first Stop or Reply, Stop when a `before` refused, else Continue.
    #[instrument(skip(self, message), fields(chat_id = %message.chat_id, message_id = %message.id))]
    pub async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        info!(chat_id = %message.chat_id, "step: handler_chain started");

        for handler in &self.handlers {
            let name = std::any::type_name_of_val(handler.as_ref());
            if !handler.before(message).await? {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
            debug!(handler = %name, "step: before done");
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            let (response_type, reply_len) = match &response {
                HandlerResponse::Continue => ("Continue", None),
                HandlerResponse::Stop => ("Stop", None),
                HandlerResponse::Ignore => ("Ignore", None),
                HandlerResponse::Reply(text) => ("Reply", Some(text.len())),
            };
            info!(
                handler = %name,
                response_type = %response_type,
                reply_len = ?reply_len,
                "step: handler done"
            );
            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                final_response = response;
                break;
            }
        }

        for handler in self.handlers.iter().rev() {
            handler.after(message, &final_response).await?;
        }

        info!(chat_id = %message.chat_id, "step: handler_chain finished");
        Ok(final_response)
    }
}
