//! order-intake CLI: console chat against the session engine, date resolution, order parsing and
//! cost estimation. Config from env (.env supported) and optional CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use date_resolver::{days_until, format_long, is_urgent, DateResolver, NO_DATE};
use handler_chain::HandlerChain;
use handlers::{AllowedChatHandler, LoggingHandler, OrderIntakeHandler};
use intake_cli::{AppConfig, Cli, Commands, ConsoleReplyChannel, JsonOrderSink};
use intake_core::{init_tracing, Attachment, InboundMessage};
use order_session::{SessionEngine, SessionSweeper};
use order_text::{card_description, estimate_cost, format_estimate, is_order, parse_order};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.log_file.clone())?;
    config.validate()?;
    init_tracing(&config.log_file)?;

    match cli.command {
        Commands::Chat {
            chat_id,
            author,
            orders_dir,
        } => run_chat(config, chat_id, author, orders_dir).await,
        Commands::ResolveDate { text, reference } => resolve_date(&config, &text.join(" "), reference),
        Commands::ParseOrder { text } => parse_order_text(&config, &text.join(" ")),
        Commands::Cost {
            grams,
            hours,
            currency,
        } => {
            let options = config.cost.clone().with_print_hours(hours.unwrap_or(0.0));
            let estimate = estimate_cost(grams, &options)?;
            println!("{}", format_estimate(&estimate, &currency));
            println!("{}", serde_json::to_string_pretty(&estimate)?);
            Ok(())
        }
    }
}

/// Reads lines from stdin and feeds them through the handler chain as messages from one chat.
async fn run_chat(
    config: AppConfig,
    chat_id: String,
    author: String,
    orders_dir: Option<std::path::PathBuf>,
) -> Result<()> {
    let engine = Arc::new(SessionEngine::new(config.session.clone()));
    let sweeper = config
        .session
        .sweep_interval
        .map(|every| SessionSweeper::start(engine.clone(), every));

    let sink = Arc::new(JsonOrderSink::new(orders_dir, config.session.utc_offset));
    let chain = HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(AllowedChatHandler::new(config.allowed_chat.clone())))
        .add_handler(Arc::new(OrderIntakeHandler::new(
            engine.clone(),
            Arc::new(ConsoleReplyChannel),
            sink,
        )));

    println!("Chat {} como {}. `/img [texto]` envía una imagen, `/salir` termina.", chat_id, author);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sent = 0usize;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/salir" {
            break;
        }
        sent += 1;
        let id = format!("console-{}", sent);
        let message = match line.strip_prefix("/img") {
            Some(caption) => {
                let caption = caption.trim();
                let mut attachment = Attachment::new(&id).with_instance("console");
                if !caption.is_empty() {
                    attachment = attachment.with_caption(caption);
                }
                InboundMessage::text(&chat_id, &author, caption)
                    .with_id(&id)
                    .with_attachment(attachment)
            }
            None => InboundMessage::text(&chat_id, &author, line).with_id(&id),
        };
        if let Err(e) = chain.handle(&message).await {
            warn!(error = %e, "Message failed");
        }
    }

    if let Some(sweeper) = sweeper {
        sweeper.stop().await;
    }
    info!(messages = sent, "Chat ended");
    Ok(())
}

fn resolve_date(config: &AppConfig, text: &str, reference: Option<String>) -> Result<()> {
    let resolver = DateResolver::new(config.session.utc_offset);
    let reference = match reference {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("--reference is not RFC 3339: {}", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    match resolver.resolve(text, reference) {
        Some(date) => {
            println!("{}", format_long(&date.instant));
            println!("instant:        {}", date.instant.to_rfc3339());
            println!("time specified: {}", date.time_specified);
            println!("matched:        {}", date.matched_text);
            println!("days remaining: {}", days_until(&date.instant, reference));
            println!("urgent:         {}", is_urgent(&date.instant, reference));
        }
        None => println!("{}", NO_DATE),
    }
    Ok(())
}

fn parse_order_text(config: &AppConfig, text: &str) -> Result<()> {
    if !is_order(text) {
        warn!("Text has no #pedido tag; parsing anyway");
    }
    let resolver = DateResolver::new(config.session.utc_offset);
    let now = Utc::now().with_timezone(&config.session.utc_offset);
    let Some(order) = parse_order(text, &resolver, now) else {
        anyhow::bail!("Nothing to parse");
    };

    println!("Título: {}", order.title);
    println!(
        "Entrega: {}",
        order
            .delivery_date
            .as_ref()
            .map(|d| format_long(&d.instant))
            .unwrap_or_else(|| NO_DATE.to_string())
    );
    println!();
    println!(
        "{}",
        card_description(
            &order.description,
            &order.details,
            order.delivery_date.as_ref().map(|d| &d.instant),
            0,
            now,
        )
    );
    Ok(())
}
