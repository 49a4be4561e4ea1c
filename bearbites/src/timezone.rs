//! Calendar dates are anchored to the dining halls' local timezone so that
//! "today" does not flip a day early or late for callers elsewhere.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Tz;

use crate::error::{BearBitesError, Result};

pub const REFERENCE_TZ: Tz = Los_Angeles;

pub fn today() -> NaiveDate {
    date_at(Utc::now())
}

pub fn date_at(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&REFERENCE_TZ).date_naive()
}

pub fn local_time_at(instant: DateTime<Utc>) -> NaiveTime {
    instant.with_timezone(&REFERENCE_TZ).time()
}

/// `M/D/YYYY`, without zero padding.
pub fn format_vendor_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| BearBitesError::Validation(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}
