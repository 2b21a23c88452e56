use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateError {
    #[error("Birth date {birth} is after the reference date {target}")]
    BirthAfterTarget { birth: NaiveDate, target: NaiveDate },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Date out of supported range")]
    OutOfRange,
}
