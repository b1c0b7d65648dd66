//! Per-chat draft order.

use chrono::{DateTime, Duration, Utc};
use date_resolver::ResolvedDate;
use intake_core::{Attachment, FinalizedOrder, InboundMessage};
use serde::{Deserialize, Serialize};

use crate::state::OrderState;

/// Title shown when an order has no text at all.
pub const FALLBACK_TITLE: &str = "Nuevo pedido";

/// Cuts `text` to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Title candidate from a fragment: its first non-blank line, cut to `max` chars.
pub fn infer_title(fragment: &str, max: usize) -> Option<String> {
    let line = fragment.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(truncate_chars(line, max))
}

/// Draft order for one chat. Exists only while a conversation is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: String,
    /// Author of the message that opened the session.
    pub author_name: String,
    pub state: OrderState,
    pub title: Option<String>,
    /// True once the user confirmed or typed the title; later fragments no longer change it.
    pub title_locked: bool,
    pub fragments: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub delivery_date: Option<ResolvedDate>,
    /// The whole reply the delivery date was resolved from, as the user typed it.
    pub delivery_date_raw_text: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: impl Into<String>, author_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            chat_id: chat_id.into(),
            author_name: author_name.into(),
            state: OrderState::AwaitingStartConfirmation,
            title: None,
            title_locked: false,
            fragments: Vec::new(),
            attachments: Vec::new(),
            delivery_date: None,
            delivery_date_raw_text: None,
            started_at: now,
            last_updated: now,
        }
    }

    /// Expired once strictly more than `timeout` has passed since the last update.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now.signed_duration_since(self.last_updated) > timeout
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }

    /// Appends a text fragment. Blank text is dropped. The first fragment seeds the title when none is set.
    pub fn append_text(&mut self, text: &str, title_max_chars: usize) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if self.title.is_none() && self.fragments.is_empty() {
            self.title = infer_title(text, title_max_chars);
        }
        self.fragments.push(text.to_string());
        true
    }

    pub fn append_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Appends whatever content `message` carries: its text as a fragment, its image as an attachment.
    pub fn append_message(&mut self, message: &InboundMessage, title_max_chars: usize) {
        self.append_text(&message.text, title_max_chars);
        if let Some(attachment) = &message.attachment {
            self.append_attachment(attachment.clone());
        }
    }

    /// Sets a title from the first fragment if there is none yet.
    pub fn ensure_title(&mut self, title_max_chars: usize) {
        if self.title.is_none() {
            self.title = self
                .fragments
                .first()
                .and_then(|f| infer_title(f, title_max_chars));
        }
    }

    /// The title that would be used right now.
    pub fn proposed_title(&self) -> &str {
        self.title.as_deref().unwrap_or(FALLBACK_TITLE)
    }

    /// Freezes the current (or fallback) title.
    pub fn lock_title(&mut self) {
        if self.title.is_none() {
            self.title = Some(FALLBACK_TITLE.to_string());
        }
        self.title_locked = true;
    }

    /// Replaces the title with the user's text as typed, cut to `title_max_chars`. Blank text is
    /// rejected.
    pub fn set_title(&mut self, text: &str, title_max_chars: usize) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.title = Some(truncate_chars(text, title_max_chars));
        self.title_locked = true;
        true
    }

    /// Stores `date` along with the reply it came from.
    pub fn set_delivery_date(&mut self, date: ResolvedDate, raw_text: &str) {
        self.delivery_date = Some(date);
        self.delivery_date_raw_text = Some(raw_text.trim().to_string());
    }

    /// Immutable snapshot of the order. Does not change the session.
    pub fn to_order(&self, now: DateTime<Utc>) -> FinalizedOrder {
        FinalizedOrder {
            chat_id: self.chat_id.clone(),
            author_name: self.author_name.clone(),
            title: self.proposed_title().to_string(),
            fragments: self.fragments.clone(),
            attachments: self.attachments.clone(),
            delivery_date: self.delivery_date.as_ref().map(|d| d.instant),
            delivery_date_text: self.delivery_date_raw_text.clone(),
            started_at: self.started_at,
            finalized_at: now,
        }
    }
}
