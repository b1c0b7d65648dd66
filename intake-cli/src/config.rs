//! Application config: logging, chat allowlist, session engine and pricing. Loaded from env.

use anyhow::Result;
use order_session::SessionConfig;
use order_text::CostOptions;
use std::env;

pub const DEFAULT_LOG_FILE: &str = "logs/order-intake.log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LOG_FILE
    pub log_file: String,
    /// WHATSAPP_GROUP_ID: only chats whose id contains this are served
    pub allowed_chat: Option<String>,
    pub session: SessionConfig,
    pub cost: CostOptions,
}

impl AppConfig {
    /// Load from environment variables. `log_file` overrides LOG_FILE if provided.
    pub fn load(log_file: Option<String>) -> Result<Self> {
        let log_file = log_file
            .or_else(|| env::var("LOG_FILE").ok())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        let allowed_chat = env::var("WHATSAPP_GROUP_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            log_file,
            allowed_chat,
            session: SessionConfig::from_env()?,
            cost: CostOptions::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_file.trim().is_empty() {
            anyhow::bail!("LOG_FILE must not be empty");
        }
        self.session.validate()?;
        self.cost.validate()?;
        Ok(())
    }
}
