//! Terminal stand-ins for the messaging gateway and the task board.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use intake_core::{FinalizedOrder, IntakeError, OrderSink, ReplyChannel, Result};
use order_text::describe_order;
use tracing::info;

/// Prints replies to stdout.
pub struct ConsoleReplyChannel;

#[async_trait]
impl ReplyChannel for ConsoleReplyChannel {
    async fn send_text(&self, _chat_id: &str, text: &str) -> Result<()> {
        println!("\n🤖 {}\n", text.replace('\n', "\n   "));
        Ok(())
    }
}

/// Renders each finalized order as JSON with its card body. Writes one file per order when a
/// directory is configured, otherwise prints.
pub struct JsonOrderSink {
    dir: Option<PathBuf>,
    offset: FixedOffset,
}

impl JsonOrderSink {
    pub fn new(dir: Option<PathBuf>, offset: FixedOffset) -> Self {
        Self { dir, offset }
    }

    pub fn render(&self, order: &FinalizedOrder) -> Result<String> {
        let card = describe_order(order, &self.offset, Utc::now());
        let value = serde_json::json!({ "order": order, "card": card });
        serde_json::to_string_pretty(&value).map_err(|e| IntakeError::Sink(e.to_string()))
    }

    fn file_name(order: &FinalizedOrder) -> String {
        let chat: String = order
            .chat_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("order-{}-{}.json", chat, order.finalized_at.format("%Y%m%dT%H%M%S"))
    }
}

#[async_trait]
impl OrderSink for JsonOrderSink {
    async fn submit(&self, order: &FinalizedOrder) -> Result<Option<String>> {
        let body = self.render(order)?;
        let Some(dir) = &self.dir else {
            println!("{}", body);
            return Ok(None);
        };
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(Self::file_name(order));
        tokio::fs::write(&path, body).await?;
        info!(path = %path.display(), "Order written");
        Ok(Some(path.display().to_string()))
    }
}
