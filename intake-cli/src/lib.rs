//! # intake-cli
//!
//! Argument parsing, config loading and the console collaborators behind the `order-intake` binary.

pub mod cli;
pub mod config;
pub mod console;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use console::{ConsoleReplyChannel, JsonOrderSink};
