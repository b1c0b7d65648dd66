//! [`DateResolver`]: normalization, then the general grammar, then the fallback idioms.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::debug;

use crate::format::{days_until, format_optional, is_urgent};
use crate::grammar::SpanishGrammar;
use crate::normalize::normalize;
use crate::types::ResolvedDate;
use crate::{idioms, offset_from_minutes, DateParser, DEFAULT_UTC_OFFSET_MINUTES};

/// Resolves dates in an operator's local offset. Cheap to clone.
#[derive(Clone)]
pub struct DateResolver {
    grammar: Arc<dyn DateParser>,
    offset: FixedOffset,
}

impl DateResolver {
    /// Resolver using [`SpanishGrammar`] in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self::with_grammar(Arc::new(SpanishGrammar), offset)
    }

    /// Resolver with a different general grammar (e.g. another language). Normalization and the
    /// fallback idioms still apply.
    pub fn with_grammar(grammar: Arc<dyn DateParser>, offset: FixedOffset) -> Self {
        Self { grammar, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Resolves `text` against `reference`, expressed in this resolver's offset.
    pub fn resolve(&self, text: &str, reference: DateTime<Utc>) -> Option<ResolvedDate> {
        self.parse(text, reference.with_timezone(&self.offset))
    }

    /// Resolves `text` against the current instant.
    pub fn resolve_now(&self, text: &str) -> Option<ResolvedDate> {
        self.resolve(text, Utc::now())
    }

    /// Long Spanish rendering, or the "no date" sentinel.
    pub fn format(&self, date: Option<&ResolvedDate>) -> String {
        format_optional(date)
    }

    /// Days left until `date` from now (negative when past).
    pub fn days_remaining(&self, date: &ResolvedDate) -> i64 {
        days_until(&date.instant, Utc::now())
    }

    pub fn is_urgent(&self, date: &ResolvedDate) -> bool {
        is_urgent(&date.instant, Utc::now())
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES).unwrap_or_else(|| Utc.fix()))
    }
}

impl DateParser for DateResolver {
    fn parse(&self, text: &str, reference: DateTime<FixedOffset>) -> Option<ResolvedDate> {
        if text.trim().is_empty() {
            return None;
        }
        let normalized = normalize(text);

        if let Some(found) = self.grammar.parse(&normalized, reference) {
            debug!(
                matched = %found.matched_text,
                resolved = %found.instant.to_rfc3339(),
                "date resolved by grammar"
            );
            return Some(found);
        }
        if let Some(found) = idioms::parse(&normalized, reference) {
            debug!(
                matched = %found.matched_text,
                resolved = %found.instant.to_rfc3339(),
                "date resolved by idiom"
            );
            return Some(found);
        }

        let preview: String = text.chars().take(50).collect();
        debug!(text = %preview, "no date found");
        None
    }
}
