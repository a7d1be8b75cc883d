use serde::{Deserialize, Serialize};

use crate::core::primitives::nullable;

pub const MIN_LABEL_COUNT: usize = 3;
pub const MAX_LABEL_COUNT: usize = 10;
pub const DEFAULT_LABEL_COUNT: usize = 6;
/// Fraction of the data span added per side at padding scale `1.0`,
/// before rounding down/up to the nice step.
pub const PADDING_RATIO: f64 = 0.05;

const STEP_EPSILON: f64 = 1e-9;

/// Input for [`compute_range`].
///
/// `min`/`max` are raw data extents (already stack-summed when stacking is
/// enabled). Overrides replace the matching bound exactly and disable padding
/// on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub label_count_hint: Option<usize>,
    #[serde(default = "default_label_count")]
    pub default_label_count: usize,
    #[serde(default = "default_padding_scale")]
    pub padding_scale_min: f64,
    #[serde(default = "default_padding_scale")]
    pub padding_scale_max: f64,
    #[serde(default)]
    pub decimal_data: bool,
    #[serde(default)]
    pub min_override: Option<f64>,
    #[serde(default)]
    pub max_override: Option<f64>,
}

fn default_label_count() -> usize {
    DEFAULT_LABEL_COUNT
}

fn default_padding_scale() -> f64 {
    1.0
}

impl RangeRequest {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            label_count_hint: None,
            default_label_count: DEFAULT_LABEL_COUNT,
            padding_scale_min: 1.0,
            padding_scale_max: 1.0,
            decimal_data: is_decimal_data(min, max),
            min_override: None,
            max_override: None,
        }
    }

    #[must_use]
    pub fn with_label_count_hint(mut self, hint: Option<usize>) -> Self {
        self.label_count_hint = hint;
        self
    }

    #[must_use]
    pub fn with_default_label_count(mut self, count: usize) -> Self {
        self.default_label_count = count;
        self
    }

    #[must_use]
    pub fn with_padding_scale(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.padding_scale_min = min_scale;
        self.padding_scale_max = max_scale;
        self
    }

    #[must_use]
    pub fn with_decimal_data(mut self, decimal_data: bool) -> Self {
        self.decimal_data = decimal_data;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_override = min;
        self.max_override = max;
        self
    }
}

/// Output of [`compute_range`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeResult {
    pub min: f64,
    pub max: f64,
    pub label_count: usize,
}

impl RangeResult {
    /// Distance between two adjacent labels.
    #[must_use]
    pub fn interval(self) -> f64 {
        (self.max - self.min) / (self.label_count.max(2) - 1) as f64
    }
}

/// Returns `true` when either bound or the span carries a fractional part.
#[must_use]
pub fn is_decimal_data(min: f64, max: f64) -> bool {
    if !min.is_finite() || !max.is_finite() {
        return false;
    }
    min.fract() != 0.0 || (max - min).fract() != 0.0
}

/// Rounds `raw` up to the nearest `{1, 2, 2.5, 5} x 10^k` value.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let exponent = raw.log10().floor();
    let magnitude = 10f64.powf(exponent);
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 + STEP_EPSILON {
        1.0
    } else if fraction <= 2.0 + STEP_EPSILON {
        2.0
    } else if fraction <= 2.5 + STEP_EPSILON {
        2.5
    } else if fraction <= 5.0 + STEP_EPSILON {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Label count used before padding: an explicit hint wins, otherwise the
/// default is bounded and doubled for decimal data.
#[must_use]
pub fn initial_label_count(hint: Option<usize>, default_count: usize, decimal_data: bool) -> usize {
    match hint {
        Some(hint) => hint.clamp(2, MAX_LABEL_COUNT),
        None => {
            let base = default_count.clamp(MIN_LABEL_COUNT, MAX_LABEL_COUNT);
            if decimal_data {
                (base * 2).min(MAX_LABEL_COUNT)
            } else {
                base
            }
        }
    }
}

/// Derives the padded axis interval and its label count.
///
/// This runs in two passes: an initial label-count estimate picks a step
/// used to pad the minimum, then the final label count is chosen from the
/// padded span so the label interval lands on a nice step.
#[must_use]
pub fn compute_range(request: &RangeRequest) -> RangeResult {
    let (mut min, mut max) = sanitize_bounds(request.min, request.max);
    let mut pad_min = sanitize_scale(request.padding_scale_min);
    let mut pad_max = sanitize_scale(request.padding_scale_max);

    let min_fixed = request.min_override.and_then(nullable);
    let max_fixed = request.max_override.and_then(nullable);
    if let Some(value) = min_fixed {
        min = value;
        pad_min = 0.0;
    }
    if let Some(value) = max_fixed {
        max = value;
        pad_max = 0.0;
    }
    if min > max {
        match (min_fixed, max_fixed) {
            (Some(_), None) => max = min,
            (None, Some(_)) => min = max,
            _ => std::mem::swap(&mut min, &mut max),
        }
    }

    if is_degenerate(min, max) {
        let spread = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        match (min_fixed.is_some(), max_fixed.is_some()) {
            (false, false) => {
                let lowered = min - spread;
                min = if min >= 0.0 && lowered < 0.0 { 0.0 } else { lowered };
                max += spread;
            }
            (true, _) => max = min + spread,
            (false, true) => min = max - spread,
        }
    }

    let estimate = initial_label_count(
        request.label_count_hint,
        request.default_label_count,
        request.decimal_data,
    );

    if pad_min == 0.0 && pad_max == 0.0 {
        return RangeResult {
            min,
            max,
            label_count: estimate,
        };
    }

    let span = max - min;
    let estimate_step = nice_step(span / (estimate - 1) as f64);

    let padded_min = if pad_min > 0.0 {
        let target = min - span * PADDING_RATIO * pad_min;
        let floored = floor_to_step(target, estimate_step);
        if min >= 0.0 && floored < 0.0 { 0.0 } else { floored }
    } else {
        min
    };

    if pad_max == 0.0 {
        return RangeResult {
            min: padded_min,
            max,
            label_count: estimate,
        };
    }

    let target_max = max + span * PADDING_RATIO * pad_max;
    let padded_span = target_max - padded_min;
    let label_count = match request.label_count_hint {
        Some(_) => estimate,
        None => best_label_count(padded_span, estimate),
    };
    let step = nice_step(padded_span / (label_count - 1) as f64);
    let padded_max = (padded_min + step * (label_count - 1) as f64).max(max);

    RangeResult {
        min: padded_min,
        max: padded_max,
        label_count,
    }
}

/// Picks the label count near `estimate` whose nice step wastes the least
/// space above the padded span.
fn best_label_count(padded_span: f64, estimate: usize) -> usize {
    let low = estimate.saturating_sub(2).max(MIN_LABEL_COUNT);
    let high = (estimate + 2).min(MAX_LABEL_COUNT);
    if low > high {
        return estimate;
    }

    let mut best = estimate;
    let mut best_score = f64::INFINITY;
    for count in low..=high {
        let step = nice_step(padded_span / (count - 1) as f64);
        let waste = (step * (count - 1) as f64 - padded_span).max(0.0) / padded_span;
        let score = waste + 0.02 * count.abs_diff(estimate) as f64;
        if score < best_score {
            best_score = score;
            best = count;
        }
    }
    best
}

fn floor_to_step(value: f64, step: f64) -> f64 {
    (value / step + STEP_EPSILON).floor() * step
}

fn sanitize_bounds(min: f64, max: f64) -> (f64, f64) {
    match (nullable(min), nullable(max)) {
        (Some(min), Some(max)) => (min, max),
        (Some(value), None) | (None, Some(value)) => (value, value),
        (None, None) => (0.0, 1.0),
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.max(0.0) } else { 0.0 }
}

fn is_degenerate(min: f64, max: f64) -> bool {
    let magnitude = min.abs().max(max.abs()).max(1.0);
    (max - min).abs() <= f64::EPSILON * magnitude
}

/// Splits `width` pixels into `count` integer slots and returns the
/// `count + 1` boundaries.
///
/// Slots differ by at most one pixel; remainder pixels go to the trailing
/// slots so the leading edge is stable.
#[must_use]
pub fn auto_divide(width: i32, count: usize) -> Vec<i32> {
    let width = width.max(0);
    if count == 0 {
        return vec![0];
    }
    let slots = i64::try_from(count).unwrap_or(i64::MAX);
    let base = i64::from(width) / slots;
    let remainder = i64::from(width) % slots;
    let first_wide = slots - remainder;

    let mut points = Vec::with_capacity(count + 1);
    let mut position = 0i64;
    points.push(0);
    for slot in 0..slots {
        position += base + i64::from(slot >= first_wide);
        points.push(i32::try_from(position).unwrap_or(width));
    }
    points
}

/// Resolved geometry for one axis during a render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub label_count: usize,
    pub divide_points: Vec<i32>,
    pub is_category: bool,
    pub size_px: i32,
}

impl AxisRange {
    /// Continuous value axis spanning `size_px` pixels.
    #[must_use]
    pub fn value(result: RangeResult, size_px: i32) -> Self {
        let label_count = result.label_count.max(2);
        Self {
            min: result.min,
            max: result.max,
            label_count,
            divide_points: auto_divide(size_px, label_count - 1),
            is_category: false,
            size_px: size_px.max(0),
        }
    }

    /// Category axis with `count` equal slots.
    #[must_use]
    pub fn category(count: usize, size_px: i32) -> Self {
        Self {
            min: 0.0,
            max: count as f64,
            label_count: count.max(1) + 1,
            divide_points: auto_divide(size_px, count),
            is_category: true,
            size_px: size_px.max(0),
        }
    }

    /// Number of slots between divide points.
    #[must_use]
    pub fn divide_count(&self) -> usize {
        self.divide_points.len().saturating_sub(1)
    }

    /// Values shown at each label position, from `min` to `max`.
    #[must_use]
    pub fn tick_values(&self) -> Vec<f64> {
        let count = self.label_count.max(2);
        let step = (self.max - self.min) / (count - 1) as f64;
        (0..count).map(|i| self.min + step * i as f64).collect()
    }

    /// Offset of `value` from the axis origin (min at 0).
    #[must_use]
    pub fn value_to_pixel(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        (value - self.min) / span * f64::from(self.size_px)
    }

    /// Same as [`Self::value_to_pixel`] measured from the far end, for
    /// vertical axes where larger values sit higher.
    #[must_use]
    pub fn value_to_pixel_inverted(&self, value: f64) -> f64 {
        f64::from(self.size_px) - self.value_to_pixel(value)
    }

    #[must_use]
    pub fn pixel_to_value(&self, pixel: f64) -> f64 {
        if self.size_px == 0 {
            return self.min;
        }
        self.min + pixel / f64::from(self.size_px) * (self.max - self.min)
    }
}

/// Extent over present values, skipping absent samples.
#[must_use]
pub fn value_extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter_map(nullable)
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Extent of per-index sums across `columns`.
///
/// Positive and negative contributions are summed separately so a stacked
/// chart's extremes include both directions.
#[must_use]
pub fn stacked_extent(columns: &[&[f64]]) -> Option<(f64, f64)> {
    let length = columns.iter().map(|column| column.len()).max()?;
    let mut extent: Option<(f64, f64)> = None;
    for index in 0..length {
        let mut positive = 0.0;
        let mut negative = 0.0;
        let mut seen = false;
        for column in columns {
            if let Some(value) = column.get(index).copied().and_then(nullable) {
                seen = true;
                if value >= 0.0 {
                    positive += value;
                } else {
                    negative += value;
                }
            }
        }
        if !seen {
            continue;
        }
        extent = Some(match extent {
            None => (negative.min(positive), positive.max(negative)),
            Some((min, max)) => (min.min(negative), max.max(positive)),
        });
    }
    extent
}
