//! Age calculator

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::{add_months, CalendarSpan};
use crate::error::DateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeReport {
    /// Completed years of age
    pub years: u32,
    /// Completed months since the last birthday
    pub months: u32,
    /// Days since the last completed month
    pub days: u32,
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub birth_weekday: Weekday,
    pub next_birthday: NaiveDate,
    pub days_until_birthday: i64,
}

/// Age on `target`
pub fn age_on(birth: NaiveDate, target: NaiveDate) -> Result<AgeReport, DateError> {
    if birth > target {
        return Err(DateError::BirthAfterTarget { birth, target });
    }

    let span = CalendarSpan::between(birth, target)?;
    let total_days = (target - birth).num_days();

    // On the birthday itself the next one is a year away
    let anniversary = add_months(birth, span.years * 12)?;
    let next_birthday = if target < anniversary {
        anniversary
    } else {
        add_months(birth, (span.years + 1) * 12)?
    };

    Ok(AgeReport {
        years: span.years,
        months: span.months,
        days: span.days,
        total_days,
        total_hours: total_days * 24,
        total_minutes: total_days * 24 * 60,
        birth_weekday: birth.weekday(),
        next_birthday,
        days_until_birthday: (next_birthday - target).num_days(),
    })
}

/// Age as of the local calendar date
pub fn age_today(birth: NaiveDate) -> Result<AgeReport, DateError> {
    age_on(birth, Local::now().date_naive())
}
