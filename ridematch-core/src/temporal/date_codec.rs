//! parsing and formatting of listing departure times.
//!
//! form input arrives in one of several layouts; output records always use
//! [`LISTING_DATE_FORMAT`].
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::InputError;

/// format used when a listing's date is reported back to the web layer.
pub const LISTING_DATE_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// format used for a listing's human readable description.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y at %I:%M %p";

/// accepted date + time input layouts, tried in order. two-digit year layouts
/// come first since `%Y` would also accept a two-digit year.
pub const DATETIME_INPUT_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    LISTING_DATE_FORMAT,
];

/// accepted date-only input layouts. these resolve to midnight.
pub const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// parses a departure time from any of the accepted input layouts. RFC 3339
/// values carrying an offset are reduced to their naive local time, so all
/// later comparisons stay timezone-naive.
pub fn parse_date(value: &str) -> Result<NaiveDateTime, InputError> {
    let trimmed = value.trim();
    if let Some(parsed) = DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(parsed);
    }
    if let Some(parsed) = DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(parsed.and_time(chrono::NaiveTime::MIN));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_local())
        .map_err(|_| InputError::UnparseableDate(value.to_string()))
}

pub fn format_listing_date(date: &NaiveDateTime) -> String {
    date.format(LISTING_DATE_FORMAT).to_string()
}

pub fn format_display_date(date: &NaiveDateTime) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub mod listing_date {
    //! serde adapter for fields stored in [`super::LISTING_DATE_FORMAT`] that
    //! accept any of the input layouts on the way in.
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_listing_date(date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str: String = String::deserialize(deserializer)?;
        super::parse_date(&date_str).map_err(|e| D::Error::custom(format!("{e}")))
    }
}
