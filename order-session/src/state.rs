//! Conversation states and input classification.

use date_resolver::ResolvedDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a conversation stands. Finalized and cancelled conversations have no state: the session is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// First message received; asked whether to start an order with it.
    AwaitingStartConfirmation,
    /// Asked whether to add more detail or proceed.
    AwaitingMoreContent,
    /// Accepting text and images; the next message is appended.
    CollectingContent,
    /// Proposed a title; waiting for yes or "other".
    AwaitingTitleConfirmation,
    /// User is typing a replacement title.
    WritingTitle,
    /// Asked for a delivery date.
    AwaitingDeliveryDate,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::AwaitingStartConfirmation => "AWAITING_START_CONFIRMATION",
            OrderState::AwaitingMoreContent => "AWAITING_MORE_CONTENT",
            OrderState::CollectingContent => "COLLECTING_CONTENT",
            OrderState::AwaitingTitleConfirmation => "AWAITING_TITLE_CONFIRMATION",
            OrderState::WritingTitle => "WRITING_TITLE",
            OrderState::AwaitingDeliveryDate => "AWAITING_DELIVERY_DATE",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command words recognized in replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cancel,
    Affirmative,
    Negative,
    /// "otro": ask for a different title.
    Change,
}

const CANCEL: &[&str] = &["cancelar", "cancela", "cancel", "/cancelar", "/cancel"];
const AFFIRMATIVE: &[&str] = &[
    "si", "s", "yes", "y", "ok", "okay", "dale", "claro", "listo", "correcto", "sip", "va", "de una",
];
const NEGATIVE: &[&str] = &["no", "n", "nop", "nope", "nel", "no gracias"];
const CHANGE: &[&str] = &["otro", "otra", "cambiar", "cambialo", "other", "otro titulo"];

/// Lowercases, trims surrounding punctuation and folds accents so "¡Sí!" and "si" compare equal.
pub fn normalize_reply(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let trimmed = lower.trim_matches(|c: char| c.is_whitespace() || ".,;:!¡?¿".contains(c));
    trimmed
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The command `text` is, if it is exactly one of the command words.
pub fn classify_command(text: &str) -> Option<Command> {
    let reply = normalize_reply(text);
    let reply = reply.as_str();
    if CANCEL.contains(&reply) {
        Some(Command::Cancel)
    } else if AFFIRMATIVE.contains(&reply) {
        Some(Command::Affirmative)
    } else if NEGATIVE.contains(&reply) {
        Some(Command::Negative)
    } else if CHANGE.contains(&reply) {
        Some(Command::Change)
    } else {
        None
    }
}

/// One inbound message, classified against the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Text that is not a command (an image may come with it).
    Text,
    /// An image with no text.
    ImageOnly,
    /// A reply in which a delivery date was found. Only produced while awaiting a date.
    Date(ResolvedDate),
    /// Nothing usable: blank text and no image.
    Empty,
}
