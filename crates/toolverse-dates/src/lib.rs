//! Calendar calculators
//!
//! Month arithmetic clamps to the end of the month, so a birthday on
//! February 29 falls on February 28 in common years.

pub mod age;
pub mod calendar;
pub mod diff;
pub mod error;

pub use age::{age_on, age_today, AgeReport};
pub use calendar::{parse_date, CalendarSpan};
pub use diff::{date_diff, d_day_label, DateDiff};
pub use error::DateError;
