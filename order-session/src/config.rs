//! Session engine config, loaded from env.

use anyhow::Result;
use chrono::{Duration, FixedOffset, Offset, Utc};
use date_resolver::{offset_from_minutes, DEFAULT_UTC_OFFSET_MINUTES};
use std::env;

pub const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 30;
pub const DEFAULT_TITLE_MAX_CHARS: usize = 80;

/// Tunables of the session engine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// SESSION_TIMEOUT_MINUTES: an untouched session older than this is treated as absent
    pub idle_timeout: Duration,
    /// TITLE_MAX_CHARS: inferred and typed titles are cut to this many characters
    pub title_max_chars: usize,
    /// UTC_OFFSET_MINUTES: operator's local offset; dates resolve and render in it
    pub utc_offset: FixedOffset,
    /// ORDER_TRIGGER: when set, only messages containing it open a session
    pub trigger: Option<String>,
    /// SESSION_SWEEP_INTERVAL_SECS: period of the optional expired-session sweep
    pub sweep_interval: Option<std::time::Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::minutes(DEFAULT_SESSION_TIMEOUT_MINUTES),
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            utc_offset: offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES)
                .unwrap_or_else(|| Utc.fix()),
            trigger: None,
            sweep_interval: None,
        }
    }
}

impl SessionConfig {
    /// Load from environment variables; unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let idle_timeout = env::var("SESSION_TIMEOUT_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::minutes)
            .unwrap_or(defaults.idle_timeout);
        let title_max_chars = env::var("TITLE_MAX_CHARS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.title_max_chars);
        let utc_offset = match env::var("UTC_OFFSET_MINUTES").ok().and_then(|s| s.parse::<i32>().ok()) {
            Some(minutes) => offset_from_minutes(minutes).ok_or_else(|| {
                anyhow::anyhow!("UTC_OFFSET_MINUTES out of range: {}", minutes)
            })?,
            None => defaults.utc_offset,
        };
        let trigger = env::var("ORDER_TRIGGER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sweep_interval = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs);

        Ok(Self {
            idle_timeout,
            title_max_chars,
            utc_offset,
            trigger,
            sweep_interval,
        })
    }

    /// Validate config (positive timeout, non-zero title length).
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout <= Duration::zero() {
            anyhow::bail!("SESSION_TIMEOUT_MINUTES must be positive");
        }
        if self.title_max_chars == 0 {
            anyhow::bail!("TITLE_MAX_CHARS must be at least 1");
        }
        Ok(())
    }
}
