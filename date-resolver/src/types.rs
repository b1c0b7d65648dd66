use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Local noon; used whenever the text names a day but no time of day.
pub(crate) fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// A date found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    /// Resolved instant in the reference offset. Noon when `time_specified` is false.
    pub instant: DateTime<FixedOffset>,
    /// Whether the text stated a time of day.
    pub time_specified: bool,
    /// The part of the (normalized) text that produced the date.
    pub matched_text: String,
}

impl ResolvedDate {
    /// Builds a result on `date` at `time` (or noon) in `offset`.
    pub fn at(
        date: NaiveDate,
        time: Option<NaiveTime>,
        offset: &FixedOffset,
        matched_text: impl Into<String>,
    ) -> Option<Self> {
        let instant = offset
            .from_local_datetime(&date.and_time(time.unwrap_or_else(noon)))
            .single()?;
        Some(Self {
            instant,
            time_specified: time.is_some(),
            matched_text: matched_text.into(),
        })
    }

    /// Calendar day in the reference offset.
    pub fn date(&self) -> NaiveDate {
        self.instant.date_naive()
    }
}
