//! Difference between two dates

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::CalendarSpan;
use crate::error::DateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateDiff {
    /// Negative when `end` is before `start`
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub span: CalendarSpan,
    pub start_weekday: Weekday,
    pub end_weekday: Weekday,
    pub d_day: String,
}

pub fn date_diff(start: NaiveDate, end: NaiveDate) -> Result<DateDiff, DateError> {
    let total_days = (end - start).num_days();
    Ok(DateDiff {
        total_days,
        total_hours: total_days * 24,
        total_minutes: total_days * 24 * 60,
        span: CalendarSpan::between(start, end)?,
        start_weekday: start.weekday(),
        end_weekday: end.weekday(),
        d_day: d_day_label(total_days),
    })
}

/// `D+n`, `D-n` or `D-DAY`
pub fn d_day_label(total_days: i64) -> String {
    match total_days {
        0 => "D-DAY".to_string(),
        n if n > 0 => format!("D+{}", n),
        n => format!("D{}", n),
    }
}
