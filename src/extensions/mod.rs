//! Analytics layered on top of series geometry.
//!
//! Nothing in `core` depends on these modules.

pub mod indicators;
pub mod markers;
pub mod marks;
pub mod patterns;
pub mod trend;

pub use indicators::{
    BollingerBands, DEFAULT_BOLLINGER_MULTIPLIER, FittedSeries, calculate_bollinger,
    calculate_ema, calculate_rsi, calculate_sma,
};
pub use markers::{
    Annotation, AnnotationPlacementConfig, AnnotationSide, LabelBox, PlacedAnnotation,
    pattern_annotations, place_annotations,
};
pub use marks::{MarkKind, MarkPoint, mark_point, mark_value, ohlc_mark_values};
pub use patterns::{
    PatternConfig, PatternDetection, PatternKind, PatternScanConfig, PatternScanResult,
    scan_patterns,
};
pub use trend::{
    TrendLineKind, cubic_regression, default_window, exponential_trend, fit_trend, fit_trends,
    linear_regression, moving_average_trend, solve_linear_system,
};
