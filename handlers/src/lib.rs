//! # Handlers for the order-intake chain
//!
//! Logging, the chat allowlist, and the handler that drives the conversation engine.

mod logging_auth;
mod order_intake;

#[cfg(test)]
mod test;

pub use logging_auth::{AllowedChatHandler, LoggingHandler};
pub use order_intake::OrderIntakeHandler;
