pub mod bar_series;
pub mod candlestick;
pub mod line_series;
pub mod primitives;
pub mod range;
pub mod types;

pub use bar_series::{
    BarGeometry, DEFAULT_MARGIN_RATIO, MIN_ITEM_WIDTH, SlotLayout, bar_baseline, compute_slot,
    project_bar, project_bar_between, project_horizontal_bar, project_horizontal_bar_between,
};
pub use candlestick::{CandleBody, CandleGeometry, OhlcSample, WickCap, project_candle};
pub use line_series::{LinePlacement, LineRun, project_line_runs, project_optional_runs};
pub use primitives::{NULL_VALUE, decimal_to_f64, nullable, time_category_labels, to_raw};
pub use range::{
    AxisRange, DEFAULT_LABEL_COUNT, MAX_LABEL_COUNT, MIN_LABEL_COUNT, PADDING_RATIO, RangeRequest,
    RangeResult, auto_divide, compute_range, is_decimal_data, nice_step, stacked_extent, value_extent,
};
pub use types::{Padding, Point, RegionBox, Viewport};
