//! Rendering and arithmetic on resolved dates: long Spanish form, day counts, urgency.

use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};

use crate::types::ResolvedDate;

/// Rendered when there is no date to show.
pub const NO_DATE: &str = "Sin fecha";

/// A date is urgent when this many days or fewer remain.
pub const URGENT_DAYS: i64 = 2;

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

/// Long Spanish form in the instant's own offset, e.g. `viernes, 25 de diciembre de 2026`.
pub fn format_long(instant: &DateTime<FixedOffset>) -> String {
    let date = instant.date_naive();
    format!(
        "{}, {} de {} de {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// [`format_long`] for an optional result; [`NO_DATE`] when absent.
pub fn format_optional(date: Option<&ResolvedDate>) -> String {
    date.map(|d| format_long(&d.instant))
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Whole days from `now` until `date`, rounded up; negative once the date has passed.
pub fn days_until(date: &DateTime<FixedOffset>, now: DateTime<Utc>) -> i64 {
    let millis = date.with_timezone(&Utc).signed_duration_since(now).num_milliseconds();
    let day = 86_400_000;
    if millis > 0 {
        (millis + day - 1) / day
    } else {
        millis / day
    }
}

/// True when [`URGENT_DAYS`] or fewer days remain (including dates already past).
pub fn is_urgent(date: &DateTime<FixedOffset>, now: DateTime<Utc>) -> bool {
    days_until(date, now) <= URGENT_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn caracas() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    #[test]
    fn test_format_long() {
        let instant = caracas().with_ymd_and_hms(2026, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(format_long(&instant), "viernes, 25 de diciembre de 2026");
        let instant = caracas().with_ymd_and_hms(2027, 7, 3, 9, 0, 0).unwrap();
        assert_eq!(format_long(&instant), "sábado, 3 de julio de 2027");
    }

    #[test]
    fn test_format_uses_local_day_not_utc() {
        // 22:00 at UTC-4 is already the next day in UTC
        let instant = caracas().with_ymd_and_hms(2026, 10, 19, 22, 0, 0).unwrap();
        assert_eq!(format_long(&instant), "lunes, 19 de octubre de 2026");
    }

    #[test]
    fn test_format_optional_none_is_sentinel() {
        assert_eq!(format_optional(None), NO_DATE);
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let in_36h = caracas().with_ymd_and_hms(2026, 10, 20, 21, 0, 0).unwrap();
        assert_eq!(days_until(&in_36h, now), 2);
        assert!(is_urgent(&in_36h, now));
    }

    #[test]
    fn test_days_until_past_is_negative() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let past = caracas().with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        assert_eq!(days_until(&past, now), -3);
        assert!(is_urgent(&past, now));
    }

    #[test]
    fn test_not_urgent_with_time_to_spare() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let later = caracas().with_ymd_and_hms(2026, 10, 26, 9, 0, 0).unwrap();
        assert_eq!(days_until(&later, now), 7);
        assert!(!is_urgent(&later, now));
    }
}
