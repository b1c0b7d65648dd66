//! # date-resolver
//!
//! Turns free-form Spanish (Venezuelan-tolerant) text into a concrete calendar date relative to a
//! reference instant, or reports that no date was found. Absence is a normal result, never an error.
//!
//! ## Modules
//!
//! - [`normalize`] – dialect and spelling normalization applied before parsing
//! - [`grammar`] – [`SpanishGrammar`], the general natural-language grammar
//! - [`idioms`] – fallback idioms tried when the grammar finds no day
//! - [`resolver`] – [`DateResolver`]: normalize → grammar → idioms
//! - [`format`] – long Spanish rendering, day counts, urgency
//!
//! ## Example
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone};
//! use date_resolver::{DateParser, DateResolver};
//!
//! let offset = FixedOffset::west_opt(4 * 3600).unwrap();
//! let resolver = DateResolver::new(offset);
//! let reference = offset.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
//! let date = resolver.parse("pa'l viernes", reference).unwrap();
//! assert_eq!(date.date().to_string(), "2026-10-23");
//! ```

pub mod format;
pub mod grammar;
pub mod idioms;
pub mod normalize;
pub mod resolver;
mod types;

use chrono::{DateTime, FixedOffset};

pub use format::{days_until, format_long, format_optional, is_urgent, NO_DATE, URGENT_DAYS};
pub use grammar::SpanishGrammar;
pub use normalize::normalize;
pub use resolver::DateResolver;
pub use types::ResolvedDate;

/// Default operator offset (UTC−4, Venezuela), in minutes east of UTC.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -240;

/// Narrow, pluggable date-parsing capability. `reference` carries the local offset results are expressed in.
pub trait DateParser: Send + Sync {
    fn parse(&self, text: &str, reference: DateTime<FixedOffset>) -> Option<ResolvedDate>;
}

/// Builds a [`FixedOffset`] from minutes east of UTC (negative for the Americas).
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}
