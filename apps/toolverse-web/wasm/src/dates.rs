//! Age and date-difference calculators

use serde::Serialize;
use toolverse_dates::{age_on, age_today, date_diff, parse_date, AgeReport, DateDiff};
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Age on `target` (`YYYY-MM-DD`), or today when omitted
#[wasm_bindgen(js_name = calculateAge)]
pub fn calculate_age(birth: &str, target: Option<String>) -> Result<JsValue, JsValue> {
    let report = age_internal(birth, target.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    to_js(&report)
}

/// Signed difference from `start` to `end`, both `YYYY-MM-DD`
#[wasm_bindgen(js_name = dateDiff)]
pub fn calculate_date_diff(start: &str, end: &str) -> Result<JsValue, JsValue> {
    let diff = date_diff_internal(start, end).map_err(|e| JsValue::from_str(&e))?;
    to_js(&diff)
}

fn age_internal(birth: &str, target: Option<&str>) -> Result<AgeReport, String> {
    let birth = parse_date(birth).map_err(|e| e.to_string())?;
    let report = match target {
        Some(target) => parse_date(target).and_then(|target| age_on(birth, target)),
        None => age_today(birth),
    };
    report.map_err(|e| e.to_string())
}

fn date_diff_internal(start: &str, end: &str) -> Result<DateDiff, String> {
    let start = parse_date(start).map_err(|e| e.to_string())?;
    let end = parse_date(end).map_err(|e| e.to_string())?;
    date_diff(start, end).map_err(|e| e.to_string())
}
