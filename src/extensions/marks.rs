use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{NULL_VALUE, OhlcSample, nullable};

/// Reference statistic drawn as a mark line or mark point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Min,
    Max,
    Average,
}

impl MarkKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Average => "avg",
        }
    }
}

/// Data point chosen by a mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkPoint {
    pub index: usize,
    pub value: f64,
}

/// Value of the statistic over present samples.
#[must_use]
pub fn mark_value(values: &[f64], kind: MarkKind) -> Option<f64> {
    match kind {
        MarkKind::Min | MarkKind::Max => mark_point(values, kind).map(|point| point.value),
        MarkKind::Average => {
            let (sum, count) = values
                .iter()
                .filter_map(|value| nullable(*value))
                .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
            (count > 0).then(|| sum / count as f64)
        }
    }
}

/// Sample that realizes the statistic.
///
/// Ties resolve to the earliest index. For `Average` this is the sample
/// closest to the mean.
#[must_use]
pub fn mark_point(values: &[f64], kind: MarkKind) -> Option<MarkPoint> {
    let present = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| nullable(*value).map(|value| MarkPoint { index, value }));
    match kind {
        MarkKind::Min => present.min_by_key(|point| (OrderedFloat(point.value), point.index)),
        MarkKind::Max => present.min_by_key(|point| (OrderedFloat(-point.value), point.index)),
        MarkKind::Average => {
            let mean = mark_value(values, MarkKind::Average)?;
            present.min_by_key(|point| (OrderedFloat((point.value - mean).abs()), point.index))
        }
    }
}

/// Values a mark reads from candles: lows for `Min`, highs for `Max`,
/// closes for `Average`. Invalid samples become absent.
#[must_use]
pub fn ohlc_mark_values(samples: &[OhlcSample], kind: MarkKind) -> Vec<f64> {
    samples
        .iter()
        .map(|sample| {
            if !sample.is_valid() {
                return NULL_VALUE;
            }
            match kind {
                MarkKind::Min => sample.low,
                MarkKind::Max => sample.high,
                MarkKind::Average => sample.close,
            }
        })
        .collect()
}
