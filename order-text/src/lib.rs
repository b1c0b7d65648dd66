//! # order-text
//!
//! Order text helpers around the conversation engine: one-shot parsing of `#pedido` messages,
//! print detail extraction, task-board card rendering, and the print-cost estimate.

pub mod cost;
pub mod description;
pub mod error;
pub mod parser;

pub use cost::{estimate_cost, format_estimate, CostEstimate, CostOptions};
pub use description::{card_description, describe_order};
pub use error::{OrderTextError, Result};
pub use parser::{extract_details, is_order, parse_order, OrderDetails, ParsedOrder, ORDER_HASHTAG};
