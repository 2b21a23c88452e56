use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::error::DateError;

/// Parse an ISO `YYYY-MM-DD` date, as sent by `<input type="date">`
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::InvalidDate(input.to_string()))
}

/// `date` plus `months`, clamped to the last day of the resulting month
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, DateError> {
    date.checked_add_months(Months::new(months))
        .ok_or(DateError::OutOfRange)
}

/// Number of whole months from `start` to `end` (`start <= end`)
pub fn full_months(start: NaiveDate, end: NaiveDate) -> Result<u32, DateError> {
    let raw = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut months = raw.max(0) as u32;
    while months > 0 && add_months(start, months)? > end {
        months -= 1;
    }
    Ok(months)
}

/// Calendar length of an interval: whole years, then whole months, then days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarSpan {
    /// Span between two dates, regardless of their order
    pub fn between(a: NaiveDate, b: NaiveDate) -> Result<Self, DateError> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let months = full_months(start, end)?;
        let anchor = add_months(start, months)?;
        Ok(Self {
            years: months / 12,
            months: months % 12,
            days: (end - anchor).num_days() as u32,
        })
    }
}
