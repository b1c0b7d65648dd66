//! Drives the session engine and delivers its results.

use std::sync::Arc;

use async_trait::async_trait;
use intake_core::{Handler, HandlerResponse, InboundMessage, OrderSink, ReplyChannel, Result};
use order_session::{Outcome, SessionEngine};
use tracing::{error, info, instrument};

/// Feeds each message to the [`SessionEngine`]. The session mutation completes before anything is
/// sent: the finalized order goes to the sink first, then the reply goes to the chat. Delivery
/// failures are logged and never undo the session change.
pub struct OrderIntakeHandler {
    engine: Arc<SessionEngine>,
    reply: Arc<dyn ReplyChannel>,
    sink: Arc<dyn OrderSink>,
}

impl OrderIntakeHandler {
    pub fn new(engine: Arc<SessionEngine>, reply: Arc<dyn ReplyChannel>, sink: Arc<dyn OrderSink>) -> Self {
        Self { engine, reply, sink }
    }

    pub fn engine(&self) -> &Arc<SessionEngine> {
        &self.engine
    }
}

#[async_trait]
impl Handler for OrderIntakeHandler {
    #[instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        let outcome = self.engine.handle(message).await;

        if let Outcome::Finalized { order, .. } = &outcome {
            match self.sink.submit(order).await {
                Ok(id) => info!(chat_id = %order.chat_id, record_id = ?id, "step: order submitted"),
                Err(e) => error!(error = %e, chat_id = %order.chat_id, "Failed to submit order"),
            }
        }

        let Some(text) = outcome.reply() else {
            return Ok(HandlerResponse::Continue);
        };
        if let Err(e) = self.reply.send_text(&message.chat_id, text).await {
            error!(error = %e, chat_id = %message.chat_id, "Failed to send reply");
        }
        Ok(HandlerResponse::Reply(text.to_string()))
    }
}
