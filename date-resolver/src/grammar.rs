//! General Spanish date grammar.
//!
//! Recognizes casual words (`hoy`, `mañana`, `pasado mañana`, `ayer`), weekday names with their
//! modifiers, `dentro de N días|semanas|meses`, `la próxima semana`, explicit dates (`25 de diciembre`,
//! `diciembre 25`, `25/12`, `2026-12-25`), a bare day of month (`el 15`) and an optional time of day.
//!
//! When several date expressions appear, the one starting first in the text wins (ties go to the
//! longer match). Relative expressions always land after the reference day; explicit day/month
//! pairs without a year roll over to the next year once passed.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::idioms;
use crate::types::ResolvedDate;
use crate::DateParser;

macro_rules! months {
    () => {
        r"(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre|ene|feb|mar|abr|may|jun|jul|ago|sept|sep|oct|nov|dic)\.?"
    };
}

macro_rules! weekdays {
    () => {
        r"(lunes|martes|mi[eé]rcoles|jueves|viernes|s[aá]bado|domingo)"
    };
}

macro_rules! weekday_prefix {
    () => {
        concat!(r"(?:(?:el\s+)?", weekdays!(), r",?\s+)?")
    };
}

static ISO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso regex must be valid")
});
static SLASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b",
        weekday_prefix!(),
        r"(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b"
    ))
    .expect("slash regex must be valid")
});
static DAY_OF_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b",
        weekday_prefix!(),
        r"(\d{1,2})\s+de\s+",
        months!(),
        r"(?:\s+(?:de|del)\s+(\d{4}))?\b"
    ))
    .expect("day-of-month regex must be valid")
});
static MONTH_NAME_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(r"\b", months!(), r"\s+(\d{1,2})\b(?:,?\s+(?:de\s+)?(\d{4})\b)?"))
        .expect("month-day regex must be valid")
});
static CASUAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(hoy|ayer|anteayer|antier|mañana|esta\s+noche|esta\s+tarde)\b")
        .expect("casual regex must be valid")
});
static WITHIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bdentro\s+de\s+(\d{1,3}|una|uno|un|dos|tres|cuatro|cinco|seis|siete|ocho|nueve|diez)\s+(días|día|dias|dia|semanas|semana|meses|mes)\b",
    )
    .expect("within regex must be valid")
});
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:(el|este|esta|pr[oó]ximo|pr[oó]xima)\s+)?",
        weekdays!(),
        r"\b(\s+de\s+la\s+pr[oó]xima\s+semana|\s+de\s+la\s+semana\s+que\s+viene|\s+que\s+viene|\s+pr[oó]ximo)?"
    ))
    .expect("weekday regex must be valid")
});
static NEXT_WEEK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:la\s+)?(?:pr[oó]xima\s+semana|semana\s+que\s+viene)\b")
        .expect("next-week regex must be valid")
});
static BARE_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bel\s+(\d{1,2})\b").expect("bare-day regex must be valid"));
static BARE_DAY_REJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*(?:/|:|a\.?\s?m|p\.?\s?m|h\b|hrs?\b|horas?\b|de\s+la\s+|de\s+",
        months!(),
        r")"
    ))
    .expect("bare-day reject regex must be valid")
});

static CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2}):(\d{2})\s*(am\b|pm\b|a\.\s?m\.?|p\.\s?m\.?)?(?:\s+de\s+la\s+(mañana|tarde|noche))?")
        .expect("clock regex must be valid")
});
static MERIDIEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s*(am\b|pm\b|a\.\s?m\.?|p\.\s?m\.?)").expect("meridiem regex must be valid")
});
static PART_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})\s+de\s+la\s+(mañana|tarde|noche)\b")
        .expect("part-of-day regex must be valid")
});
static AT_HOUR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\ba\s+las?\s+(\d{1,2})\b").expect("at-hour regex must be valid")
});
static MIDDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:al\s+)?mediod[ií]a\b").expect("midday regex must be valid")
});

/// A date expression found in text, by byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateMatch {
    start: usize,
    end: usize,
    date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimeMatch {
    time: NaiveTime,
    text: String,
}

/// The default grammar for Spanish text. Expects lowercase input (see [`crate::normalize`]) but
/// lowercases again so it can be used on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanishGrammar;

impl DateParser for SpanishGrammar {
    fn parse(&self, text: &str, reference: DateTime<FixedOffset>) -> Option<ResolvedDate> {
        let text = text.to_lowercase();
        let today = reference.date_naive();
        let time = find_time(&text);

        match (find_date(&text, today), time) {
            (Some(m), time) => {
                let matched = match &time {
                    Some(t) if !text[m.start..m.end].contains(&t.text) => {
                        format!("{} {}", &text[m.start..m.end], t.text)
                    }
                    _ => text[m.start..m.end].to_string(),
                };
                ResolvedDate::at(m.date, time.map(|t| t.time), reference.offset(), matched)
            }
            (None, Some(t)) => {
                // "en 3 días a las 5pm": the idiom names the day, the grammar only the time
                if let Some(idiom) = idioms::parse(&text, reference) {
                    let matched = format!("{} {}", idiom.matched_text, t.text);
                    return ResolvedDate::at(idiom.date(), Some(t.time), reference.offset(), matched);
                }
                let day = if today.and_time(t.time) <= reference.naive_local() {
                    today.succ_opt()?
                } else {
                    today
                };
                ResolvedDate::at(day, Some(t.time), reference.offset(), t.text)
            }
            (None, None) => None,
        }
    }
}

fn find_date(text: &str, today: NaiveDate) -> Option<DateMatch> {
    [
        iso(text),
        slash(text, today),
        day_of_month_name(text, today),
        month_name_day(text, today),
        casual(text, today),
        within(text, today),
        weekday(text, today),
        next_week(text, today),
        bare_day(text, today),
    ]
    .into_iter()
    .flatten()
    .min_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)))
}

fn matched(caps: &Captures, date: NaiveDate) -> Option<DateMatch> {
    let whole = caps.get(0)?;
    Some(DateMatch {
        start: whole.start(),
        end: whole.end(),
        date,
    })
}

fn num(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.');
    let n = match name {
        "enero" | "ene" => 1,
        "febrero" | "feb" => 2,
        "marzo" | "mar" => 3,
        "abril" | "abr" => 4,
        "mayo" | "may" => 5,
        "junio" | "jun" => 6,
        "julio" | "jul" => 7,
        "agosto" | "ago" => 8,
        "septiembre" | "setiembre" | "sept" | "sep" => 9,
        "octubre" | "oct" => 10,
        "noviembre" | "nov" => 11,
        "diciembre" | "dic" => 12,
        _ => return None,
    };
    Some(n)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "lunes" => Some(Weekday::Mon),
        "martes" => Some(Weekday::Tue),
        "miércoles" | "miercoles" => Some(Weekday::Wed),
        "jueves" => Some(Weekday::Thu),
        "viernes" => Some(Weekday::Fri),
        "sábado" | "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

fn count_word(word: &str) -> Option<u32> {
    match word {
        "un" | "una" | "uno" => Some(1),
        "dos" => Some(2),
        "tres" => Some(3),
        "cuatro" => Some(4),
        "cinco" => Some(5),
        "seis" => Some(6),
        "siete" => Some(7),
        "ocho" => Some(8),
        "nueve" => Some(9),
        "diez" => Some(10),
        digits => digits.parse().ok(),
    }
}

/// First `month`/`day` on or after `today`, looking a few years ahead for 29 February.
fn next_month_day(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    (today.year()..=today.year() + 4)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
}

/// First occurrence of day-of-month `day` on or after `today`.
fn next_day_of_month(today: NaiveDate, day: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let mut first = today.with_day(1)?;
    for _ in 0..13 {
        if let Some(date) = first.with_day(day) {
            if date >= today {
                return Some(date);
            }
        }
        first = first.checked_add_months(Months::new(1))?;
    }
    None
}

/// Next `target` strictly after `today`.
pub(crate) fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let diff = (i64::from(target.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);
    today + Duration::days(if diff == 0 { 7 } else { diff })
}

/// `target` in the Monday-to-Sunday week after the one containing `today`.
fn weekday_of_next_week(today: NaiveDate, target: Weekday) -> NaiveDate {
    let to_monday = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(to_monday + i64::from(target.num_days_from_monday()))
}

fn year_from(caps: &Captures, group: usize) -> Option<Option<i32>> {
    match caps.get(group) {
        None => Some(None),
        Some(y) => match y.as_str().len() {
            2 => Some(Some(2000 + y.as_str().parse::<i32>().ok()?)),
            4 => Some(Some(y.as_str().parse().ok()?)),
            _ => None,
        },
    }
}

fn explicit_or_next(today: NaiveDate, year: Option<i32>, month: u32, day: u32) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => next_month_day(today, month, day),
    }
}

fn iso(text: &str) -> Option<DateMatch> {
    ISO.captures_iter(text).find_map(|caps| {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, num(&caps, 2)?, num(&caps, 3)?)?;
        matched(&caps, date)
    })
}

fn slash(text: &str, today: NaiveDate) -> Option<DateMatch> {
    SLASH.captures_iter(text).find_map(|caps| {
        let day = num(&caps, 2)?;
        let month = num(&caps, 3)?;
        let year = year_from(&caps, 4)?;
        matched(&caps, explicit_or_next(today, year, month, day)?)
    })
}

fn day_of_month_name(text: &str, today: NaiveDate) -> Option<DateMatch> {
    DAY_OF_MONTH_NAME.captures_iter(text).find_map(|caps| {
        let day = num(&caps, 2)?;
        let month = month_number(caps.get(3)?.as_str())?;
        let year = year_from(&caps, 4)?;
        matched(&caps, explicit_or_next(today, year, month, day)?)
    })
}

fn month_name_day(text: &str, today: NaiveDate) -> Option<DateMatch> {
    MONTH_NAME_DAY.captures_iter(text).find_map(|caps| {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = num(&caps, 2)?;
        let year = year_from(&caps, 3)?;
        matched(&caps, explicit_or_next(today, year, month, day)?)
    })
}

fn casual(text: &str, today: NaiveDate) -> Option<DateMatch> {
    CASUAL.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let word = caps.get(1)?.as_str();
        let mut start = whole.start();
        let offset_days = match word {
            "hoy" => 0,
            "ayer" => -1,
            "anteayer" | "antier" => -2,
            "mañana" => {
                let before = text[..start].trim_end();
                match before.split_whitespace().last() {
                    // "de la mañana", "por la mañana": part of day, not a date
                    Some("la") => return None,
                    Some("esta") => {
                        start = before.len() - "esta".len();
                        0
                    }
                    Some("pasado") => {
                        start = before.len() - "pasado".len();
                        2
                    }
                    _ => 1,
                }
            }
            _ => 0,
        };
        Some(DateMatch {
            start,
            end: whole.end(),
            date: today + Duration::days(offset_days),
        })
    })
}

fn within(text: &str, today: NaiveDate) -> Option<DateMatch> {
    WITHIN.captures_iter(text).find_map(|caps| {
        let n = count_word(caps.get(1)?.as_str())?;
        let unit = caps.get(2)?.as_str();
        let date = if unit.starts_with("d") {
            today + Duration::days(i64::from(n))
        } else if unit.starts_with("semana") {
            today + Duration::weeks(i64::from(n))
        } else {
            today.checked_add_months(Months::new(n))?
        };
        matched(&caps, date)
    })
}

fn weekday(text: &str, today: NaiveDate) -> Option<DateMatch> {
    WEEKDAY.captures_iter(text).find_map(|caps| {
        let target = weekday_from_name(caps.get(2)?.as_str())?;
        let next_week = caps
            .get(3)
            .map(|suffix| suffix.as_str().contains("semana"))
            .unwrap_or(false);
        let date = if next_week {
            weekday_of_next_week(today, target)
        } else {
            next_weekday(today, target)
        };
        matched(&caps, date)
    })
}

fn next_week(text: &str, today: NaiveDate) -> Option<DateMatch> {
    let m = NEXT_WEEK.find(text)?;
    Some(DateMatch {
        start: m.start(),
        end: m.end(),
        date: today + Duration::days(7),
    })
}

fn bare_day(text: &str, today: NaiveDate) -> Option<DateMatch> {
    BARE_DAY.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if BARE_DAY_REJECT.is_match(&text[whole.end()..]) {
            return None;
        }
        matched(&caps, next_day_of_month(today, num(&caps, 1)?)?)
    })
}

/// Converts a 12-hour reading to 24-hour time. `meridiem` is `am`/`pm` (any dotted form);
/// `part` is `mañana`/`tarde`/`noche`.
fn to_time(hour: u32, minute: u32, meridiem: Option<&str>, part: Option<&str>) -> Option<NaiveTime> {
    let mut hour = hour;
    match (meridiem, part) {
        (Some(m), _) => {
            if hour > 12 {
                return None;
            }
            let pm = m.starts_with('p');
            if pm && hour < 12 {
                hour += 12;
            } else if !pm && hour == 12 {
                hour = 0;
            }
        }
        (None, Some("tarde")) | (None, Some("noche")) => {
            if hour < 12 {
                hour += 12;
            }
        }
        (None, Some(_)) => {
            if hour == 12 {
                hour = 0;
            }
        }
        (None, None) => {}
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn find_time(text: &str) -> Option<TimeMatch> {
    let text_of = |caps: &Captures| caps.get(0).map(|m| m.as_str().trim().to_string());

    if let Some(found) = CLOCK.captures_iter(text).find_map(|caps| {
        let time = to_time(
            num(&caps, 1)?,
            num(&caps, 2)?,
            caps.get(3).map(|m| m.as_str()),
            caps.get(4).map(|m| m.as_str()),
        )?;
        Some(TimeMatch { time, text: text_of(&caps)? })
    }) {
        return Some(found);
    }
    if let Some(found) = MERIDIEM.captures_iter(text).find_map(|caps| {
        let time = to_time(num(&caps, 1)?, 0, caps.get(2).map(|m| m.as_str()), None)?;
        Some(TimeMatch { time, text: text_of(&caps)? })
    }) {
        return Some(found);
    }
    if let Some(found) = PART_OF_DAY.captures_iter(text).find_map(|caps| {
        let time = to_time(num(&caps, 1)?, 0, None, caps.get(2).map(|m| m.as_str()))?;
        Some(TimeMatch { time, text: text_of(&caps)? })
    }) {
        return Some(found);
    }
    if let Some(found) = AT_HOUR.captures_iter(text).find_map(|caps| {
        let hour = num(&caps, 1)?;
        // "a las 3" in a shop conversation means the afternoon
        let hour = if (1..=7).contains(&hour) { hour + 12 } else { hour };
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        Some(TimeMatch { time, text: text_of(&caps)? })
    }) {
        return Some(found);
    }
    MIDDAY.find(text).and_then(|m| {
        Some(TimeMatch {
            time: NaiveTime::from_hms_opt(12, 0, 0)?,
            text: m.as_str().to_string(),
        })
    })
}
