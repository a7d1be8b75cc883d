use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

const MAX_DERIVED_PRECISION: u32 = 8;

/// Decimals needed to tell adjacent ticks `step` apart.
#[must_use]
pub fn precision_for_step(step: f64) -> u32 {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    let mut precision = 0;
    let mut scaled = step;
    while precision < MAX_DERIVED_PRECISION && (scaled - scaled.round()).abs() > 1e-9 * scaled.max(1.0)
    {
        scaled *= 10.0;
        precision += 1;
    }
    precision
}

/// Formats an axis value with exactly `precision` decimals and an optional
/// unit suffix.
///
/// Values go through `Decimal` so float noise such as `0.30000000000000004`
/// never reaches a label, and rounding to zero never prints `-0`.
#[must_use]
pub fn format_axis_value(value: f64, precision: u32, unit: Option<&str>) -> String {
    let mut text = match Decimal::from_f64(value) {
        Some(decimal) => {
            let mut rounded = decimal.round_dp(precision);
            if rounded.is_zero() {
                rounded = Decimal::ZERO;
            }
            rounded.rescale(precision);
            rounded.to_string()
        }
        None => {
            let precision = precision as usize;
            format!("{value:.precision$}")
        }
    };
    if let Some(unit) = unit {
        text.push_str(unit);
    }
    text
}

/// Labels for every tick of a value axis.
#[must_use]
pub fn format_tick_labels(
    ticks: &[f64],
    precision: Option<u32>,
    unit: Option<&str>,
) -> Vec<String> {
    let step = match ticks {
        [first, second, ..] => (second - first).abs(),
        _ => 1.0,
    };
    let precision = precision.unwrap_or_else(|| precision_for_step(step));
    ticks
        .iter()
        .map(|tick| format_axis_value(*tick, precision, unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{format_axis_value, format_tick_labels, precision_for_step};

    #[test]
    fn precision_follows_step() {
        assert_eq!(precision_for_step(20.0), 0);
        assert_eq!(precision_for_step(0.5), 1);
        assert_eq!(precision_for_step(0.25), 2);
        assert_eq!(precision_for_step(2.5), 1);
    }

    #[test]
    fn float_noise_and_negative_zero_are_hidden() {
        assert_eq!(format_axis_value(0.1 + 0.2, 1, None), "0.3");
        assert_eq!(format_axis_value(-0.0001, 2, None), "0.00");
        assert_eq!(format_axis_value(12.0, 0, Some("%")), "12%");
    }

    #[test]
    fn tick_labels_share_precision() {
        let labels = format_tick_labels(&[0.0, 0.5, 1.0], None, None);
        assert_eq!(labels, vec!["0.0", "0.5", "1.0"]);
    }
}
