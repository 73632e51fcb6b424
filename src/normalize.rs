//! Field-level normalization of legacy values: phone numbers, names and
//! the two date formats found in the export.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, ParseError};
use thiserror::Error;

pub const COUNTRY_CODE: &str = "91";
const NATIONAL_NUMBER_LEN: usize = 10;
const ORDER_DATE_FORMAT: &str = "%m/%d/%Y";
const ORDER_YEAR_LEN: usize = 4;
const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const OFFSET_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];
const MISSING_LAST_NAME: &str = "NA";

/// How the country code is applied once formatting has been stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonePolicy {
    /// Prefix the country code only when exactly ten digits remain; any
    /// other length is kept as-is.
    PrefixTenDigits,
    /// Keep the last ten digits (or all of them, if fewer) and always
    /// prefix the country code.
    LastTenDigits,
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn normalize_phone(raw: &str, policy: PhonePolicy) -> String {
    let digits = digits_only(raw);
    match policy {
        PhonePolicy::PrefixTenDigits if digits.len() == NATIONAL_NUMBER_LEN => {
            format!("{COUNTRY_CODE}{digits}")
        }
        PhonePolicy::PrefixTenDigits => digits,
        PhonePolicy::LastTenDigits => {
            let start = digits.len().saturating_sub(NATIONAL_NUMBER_LEN);
            format!("{COUNTRY_CODE}{}", &digits[start..])
        }
    }
}

pub fn normalize_vendor_phone(raw: &str) -> String {
    normalize_phone(raw, PhonePolicy::LastTenDigits)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Splits on whitespace; the middle tokens are dropped. A single token
/// gets the `NA` placeholder as last name. Returns `None` for a blank name.
pub fn split_name(full_name: &str) -> Option<PersonName> {
    let mut parts = full_name.split_whitespace();
    let first = parts.next()?;
    let last = parts.last().unwrap_or(MISSING_LAST_NAME);

    Some(PersonName {
        first: first.to_string(),
        last: last.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum DateError {
    #[error("expected MM/DD/YYYY with a four-digit year")]
    NotMonthDayYear,
    #[error(transparent)]
    Format(#[from] ParseError),
}

/// Parses a strict `MM/DD/YYYY` order date to midnight of that day.
/// Surrounding whitespace and two-digit years are rejected.
pub fn parse_order_date(value: &str) -> Result<NaiveDateTime, DateError> {
    if !is_month_day_year(value) {
        return Err(DateError::NotMonthDayYear);
    }
    let date = NaiveDate::parse_from_str(value, ORDER_DATE_FORMAT)?;
    Ok(date.and_time(NaiveTime::MIN))
}

fn is_month_day_year(value: &str) -> bool {
    let parts: Vec<&str> = value.split('/').collect();
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };

    parts.len() == 3
        && digits(parts[0], 1, 2)
        && digits(parts[1], 1, 2)
        && digits(parts[2], ORDER_YEAR_LEN, ORDER_YEAR_LEN)
}

/// Parses an ISO-8601 timestamp after stripping trailing `Z`s. Accepts a
/// `T` or space separator, optional seconds and fraction, or a bare date
/// (midnight). A value with an explicit offset is converted to UTC; any
/// other value is read as the same wall-clock time.
pub fn parse_naive_timestamp(value: &str) -> Result<NaiveDateTime, DateError> {
    let value = value.trim_end_matches('Z');

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            OFFSET_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(value, format).ok())
                .map(|timestamp| timestamp.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_or_else(|| value.parse().map_err(DateError::from), Ok)
}
