use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

/// Reserved input value meaning "no sample at this index".
///
/// It is only recognized on input; every reader converts through [`nullable`]
/// before doing arithmetic.
pub const NULL_VALUE: f64 = f64::MAX;

/// Converts a raw sample into an optional value.
///
/// `NULL_VALUE` and non-finite values are treated as absent.
#[must_use]
pub fn nullable(value: f64) -> Option<f64> {
    if value == NULL_VALUE || !value.is_finite() {
        None
    } else {
        Some(value)
    }
}

/// Converts an optional value back into the raw input encoding.
#[must_use]
pub fn to_raw(value: Option<f64>) -> f64 {
    value.unwrap_or(NULL_VALUE)
}

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Formats timestamps into category-axis labels.
#[must_use]
pub fn time_category_labels(times: &[DateTime<Utc>], format: &str) -> Vec<String> {
    times
        .iter()
        .map(|time| time.format(format).to_string())
        .collect()
}
