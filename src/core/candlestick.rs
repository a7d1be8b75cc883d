use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::{NULL_VALUE, decimal_to_f64};
use crate::core::{AxisRange, SlotLayout};
use crate::error::{ChartError, ChartResult};

/// One OHLC candle. Samples are positional: their index is their category slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcSample {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcSample {
    #[must_use]
    pub const fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    /// Placeholder sample that keeps an index slot without drawing anything.
    #[must_use]
    pub const fn null() -> Self {
        Self::new(NULL_VALUE, NULL_VALUE, NULL_VALUE, NULL_VALUE)
    }

    /// Converts decimal quotes into a sample; the result is not validated.
    pub fn from_decimal(
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Ok(Self::new(
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        ))
    }

    /// Checks the drawing invariants.
    ///
    /// Invariants:
    /// - all values are finite and none is `NULL_VALUE`
    /// - `low <= min(open, close)`
    /// - `max(open, close) <= high`
    pub fn validate(self) -> ChartResult<()> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value == NULL_VALUE {
                return Err(ChartError::InvalidData(format!(
                    "ohlc `{name}` must be a present finite value"
                )));
            }
        }
        if self.low > self.open.min(self.close) {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= min(open, close)".to_owned(),
            ));
        }
        if self.open.max(self.close) > self.high {
            return Err(ChartError::InvalidData(
                "ohlc high must be >= max(open, close)".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.validate().is_ok()
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }

    #[must_use]
    pub fn is_bearish(self) -> bool {
        self.close < self.open
    }

    #[must_use]
    pub fn body(self) -> f64 {
        (self.close - self.open).abs()
    }

    #[must_use]
    pub fn range(self) -> f64 {
        self.high - self.low
    }

    #[must_use]
    pub fn body_top(self) -> f64 {
        self.open.max(self.close)
    }

    #[must_use]
    pub fn body_bottom(self) -> f64 {
        self.open.min(self.close)
    }

    #[must_use]
    pub fn upper_shadow(self) -> f64 {
        self.high - self.body_top()
    }

    #[must_use]
    pub fn lower_shadow(self) -> f64 {
        self.body_bottom() - self.low
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        (self.open + self.close) / 2.0
    }
}

/// Candle body: a rectangle, or a 1-px line when open and close coincide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CandleBody {
    Rect {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
    Line {
        left: f64,
        right: f64,
        y: f64,
    },
}

/// Horizontal cap drawn at a wick end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WickCap {
    pub left: f64,
    pub right: f64,
    pub y: f64,
}

/// Projected candle geometry in series-region pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub center_x: f64,
    pub body: CandleBody,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub upper_cap: Option<WickCap>,
    pub lower_cap: Option<WickCap>,
    pub is_bullish: bool,
}

/// Projects one candle into its slot.
///
/// Returns `None` for invalid samples; callers keep iterating so later
/// candles stay aligned with their divisions.
#[must_use]
pub fn project_candle(
    sample: OhlcSample,
    division_start: i32,
    series_index: usize,
    slot: SlotLayout,
    axis: &AxisRange,
) -> Option<CandleGeometry> {
    if let Err(err) = sample.validate() {
        trace!(%err, division_start, "skip invalid candle");
        return None;
    }

    let center_x = slot.center(division_start, series_index);
    let left = f64::from(slot.item_left(division_start, series_index));
    let right = left + f64::from(slot.item_width);

    let open_y = axis.value_to_pixel_inverted(sample.open);
    let close_y = axis.value_to_pixel_inverted(sample.close);
    let wick_top = axis.value_to_pixel_inverted(sample.high);
    let wick_bottom = axis.value_to_pixel_inverted(sample.low);
    let body_top = open_y.min(close_y);
    let body_bottom = open_y.max(close_y);

    let body = if (body_bottom - body_top).abs() < 1.0 {
        CandleBody::Line {
            left,
            right,
            y: body_top.round(),
        }
    } else {
        CandleBody::Rect {
            left,
            right,
            top: body_top,
            bottom: body_bottom,
        }
    };

    let cap_half = (f64::from(slot.item_width) / 4.0).max(1.0);
    let cap = |y: f64| WickCap {
        left: center_x - cap_half,
        right: center_x + cap_half,
        y,
    };

    Some(CandleGeometry {
        center_x,
        body,
        wick_top,
        wick_bottom,
        upper_cap: (wick_top < body_top).then(|| cap(wick_top)),
        lower_cap: (wick_bottom > body_bottom).then(|| cap(wick_bottom)),
        is_bullish: sample.is_bullish(),
    })
}
