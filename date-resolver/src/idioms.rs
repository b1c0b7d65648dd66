//! Fallback idioms tried only when the grammar finds no day, in this fixed order:
//! `en N días`, `esta semana` (coming Friday), `fin de semana` (coming Saturday).
//!
//! "Coming" means strictly after the reference day, so on a Friday `esta semana` is next week's Friday.
//! A time of day next to an idiom is applied by the grammar.

use chrono::{DateTime, Duration, FixedOffset, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::next_weekday;
use crate::types::ResolvedDate;

static IN_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\ben\s+(\d+)\s+d[ií]as?\b").expect("in-days regex must be valid"));

/// Returns the first idiom that matches `text` (already normalized).
pub fn parse(text: &str, reference: DateTime<FixedOffset>) -> Option<ResolvedDate> {
    let today = reference.date_naive();
    let offset = reference.offset();

    if let Some(caps) = IN_DAYS.captures(text) {
        let whole = caps.get(0)?.as_str();
        let days: i64 = caps.get(1)?.as_str().parse().ok()?;
        let date = today.checked_add_signed(Duration::try_days(days)?)?;
        return ResolvedDate::at(date, None, offset, whole);
    }
    if text.contains("esta semana") {
        return ResolvedDate::at(next_weekday(today, Weekday::Fri), None, offset, "esta semana");
    }
    if text.contains("fin de semana") {
        return ResolvedDate::at(next_weekday(today, Weekday::Sat), None, offset, "fin de semana");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, 18, 45, 0)
            .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_in_days_is_noon_n_days_later() {
        let resolved = parse("en 3 días", at(2026, 10, 19)).unwrap();
        assert_eq!(resolved.date(), ymd(2026, 10, 22));
        assert_eq!(resolved.instant.to_rfc3339(), "2026-10-22T12:00:00-04:00");
        assert!(!resolved.time_specified);
    }

    #[test]
    fn test_this_week_before_friday() {
        assert_eq!(parse("esta semana", at(2026, 10, 19)).unwrap().date(), ymd(2026, 10, 23));
        assert_eq!(parse("esta semana", at(2026, 10, 25)).unwrap().date(), ymd(2026, 10, 30));
    }

    #[test]
    fn test_this_week_on_friday_or_saturday_rolls_over() {
        assert_eq!(parse("esta semana", at(2026, 10, 23)).unwrap().date(), ymd(2026, 10, 30));
        assert_eq!(parse("esta semana", at(2026, 10, 24)).unwrap().date(), ymd(2026, 10, 30));
    }

    #[test]
    fn test_weekend() {
        assert_eq!(parse("el fin de semana", at(2026, 10, 19)).unwrap().date(), ymd(2026, 10, 24));
        assert_eq!(parse("fin de semana", at(2026, 10, 24)).unwrap().date(), ymd(2026, 10, 31));
    }

    #[test]
    fn test_in_days_takes_precedence() {
        let resolved = parse("en 2 días o esta semana", at(2026, 10, 19)).unwrap();
        assert_eq!(resolved.date(), ymd(2026, 10, 21));
    }

    #[test]
    fn test_no_idiom() {
        assert!(parse("cuando puedas", at(2026, 10, 19)).is_none());
    }
}
