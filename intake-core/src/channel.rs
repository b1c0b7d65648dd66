//! Outbound collaborators: where replies and finalized orders go.
//!
//! Both traits are transport-agnostic; implementations map to a messaging gateway or a task board.

use crate::error::Result;
use crate::types::FinalizedOrder;
use async_trait::async_trait;

/// Delivers reply text back to a chat.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// Persists a finalized order externally (e.g. as a task-board card). Delivery and retries are the sink's concern.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Returns an identifier for the created record, if the sink has one.
    async fn submit(&self, order: &FinalizedOrder) -> Result<Option<String>>;
}
