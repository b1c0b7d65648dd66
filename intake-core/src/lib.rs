//! # intake-core
//!
//! Core types and traits for the order-intake bot: [`InboundMessage`], [`FinalizedOrder`], [`Handler`],
//! outbound collaborators ([`ReplyChannel`], [`OrderSink`]) and tracing initialization. Transport-agnostic;
//! used by handler-chain, handlers, order-session and the CLI.

pub mod channel;
pub mod error;
pub mod logger;
pub mod types;

pub use channel::{OrderSink, ReplyChannel};
pub use error::{HandlerError, IntakeError, Result};
pub use logger::init_tracing;
pub use types::{Attachment, FinalizedOrder, Handler, HandlerResponse, InboundMessage};
