//! CLI parser.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "order-intake")]
#[command(about = "WhatsApp order intake: console chat, date resolution, order parsing, cost", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Overrides LOG_FILE.
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Talk to the session engine from the terminal. `/img [caption]` sends an image.
    Chat {
        #[arg(long, default_value = "consola@g.us")]
        chat_id: String,
        #[arg(long, default_value = "Operador")]
        author: String,
        /// Write finalized orders as JSON files here instead of printing them.
        #[arg(long)]
        orders_dir: Option<PathBuf>,
    },
    /// Resolve a Spanish date expression, e.g. `resolve-date "pa'l viernes"`.
    ResolveDate {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Reference instant (RFC 3339); defaults to now.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Parse a one-shot `#pedido` message and print the card body.
    ParseOrder {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Estimate the price of a print.
    Cost {
        grams: f64,
        /// Printer hours (adds machine cost).
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long, default_value = "$")]
        currency: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_date_joins_words() {
        let cli = Cli::parse_from(["order-intake", "resolve-date", "pa'l", "viernes"]);
        match cli.command {
            Commands::ResolveDate { text, reference } => {
                assert_eq!(text.join(" "), "pa'l viernes");
                assert!(reference.is_none());
            }
            _ => panic!("expected resolve-date"),
        }
    }

    #[test]
    fn test_parse_cost_with_global_log_file() {
        let cli = Cli::parse_from(["order-intake", "cost", "120", "--hours", "2", "--log-file", "x.log"]);
        assert_eq!(cli.log_file.as_deref(), Some("x.log"));
        match cli.command {
            Commands::Cost { grams, hours, currency } => {
                assert_eq!(grams, 120.0);
                assert_eq!(hours, Some(2.0));
                assert_eq!(currency, "$");
            }
            _ => panic!("expected cost"),
        }
    }

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::parse_from(["order-intake", "chat"]);
        match cli.command {
            Commands::Chat { chat_id, author, orders_dir } => {
                assert_eq!(chat_id, "consola@g.us");
                assert_eq!(author, "Operador");
                assert!(orders_dir.is_none());
            }
            _ => panic!("expected chat"),
        }
    }
}
