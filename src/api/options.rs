use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_MARGIN_RATIO, OhlcSample, Padding, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{MarkKind, PatternScanConfig, TrendLineKind};
use crate::render::Color;
use crate::render::theme::DEFAULT_THEME;

/// Chart family of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Line,
    Bar,
    HorizontalBar,
    Candlestick,
}

impl SeriesKind {
    /// `true` for families that occupy a slot inside each category section.
    #[must_use]
    pub fn is_slotted(self) -> bool {
        matches!(self, Self::Bar | Self::HorizontalBar | Self::Candlestick)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::HorizontalBar => "horizontal_bar",
            Self::Candlestick => "candlestick",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Samples of one series. `NULL_VALUE` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesData {
    Values(Vec<f64>),
    Ohlc(Vec<OhlcSample>),
}

impl SeriesData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Values(values) => values.len(),
            Self::Ohlc(samples) => samples.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values used by value-based fits; closes for candles, absent where a
    /// candle is invalid.
    #[must_use]
    pub fn fit_values(&self) -> Vec<f64> {
        match self {
            Self::Values(values) => values.clone(),
            Self::Ohlc(samples) => samples
                .iter()
                .map(|sample| {
                    if sample.is_valid() {
                        sample.close
                    } else {
                        crate::core::NULL_VALUE
                    }
                })
                .collect(),
        }
    }
}

/// Per-series paint overrides; unset fields come from the palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Desired item width in pixels for bars and candles.
    #[serde(default)]
    pub bar_width: Option<i32>,
    #[serde(default = "default_margin_ratio")]
    pub margin_ratio: f64,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            color: None,
            stroke_width: default_stroke_width(),
            bar_width: None,
            margin_ratio: default_margin_ratio(),
        }
    }
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_margin_ratio() -> f64 {
    DEFAULT_MARGIN_RATIO
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOptions {
    pub name: String,
    pub kind: SeriesKind,
    pub data: SeriesData,
    #[serde(default)]
    pub y_axis_index: usize,
    #[serde(default)]
    pub style: SeriesStyle,
    #[serde(default)]
    pub trend_lines: Vec<TrendLineKind>,
    #[serde(default)]
    pub mark_lines: Vec<MarkKind>,
    #[serde(default)]
    pub mark_points: Vec<MarkKind>,
    #[serde(default)]
    pub patterns: Option<PatternScanConfig>,
}

impl SeriesOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SeriesKind, data: SeriesData) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            y_axis_index: 0,
            style: SeriesStyle::default(),
            trend_lines: Vec::new(),
            mark_lines: Vec::new(),
            mark_points: Vec::new(),
            patterns: None,
        }
    }

    #[must_use]
    pub fn line(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, SeriesKind::Line, SeriesData::Values(values))
    }

    #[must_use]
    pub fn bar(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, SeriesKind::Bar, SeriesData::Values(values))
    }

    #[must_use]
    pub fn horizontal_bar(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, SeriesKind::HorizontalBar, SeriesData::Values(values))
    }

    #[must_use]
    pub fn candlestick(name: impl Into<String>, samples: Vec<OhlcSample>) -> Self {
        Self::new(name, SeriesKind::Candlestick, SeriesData::Ohlc(samples))
    }

    #[must_use]
    pub fn with_y_axis_index(mut self, index: usize) -> Self {
        self.y_axis_index = index;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.style.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_bar_width(mut self, width: i32) -> Self {
        self.style.bar_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_trend_line(mut self, kind: TrendLineKind) -> Self {
        self.trend_lines.push(kind);
        self
    }

    #[must_use]
    pub fn with_mark_line(mut self, kind: MarkKind) -> Self {
        self.mark_lines.push(kind);
        self
    }

    #[must_use]
    pub fn with_mark_point(mut self, kind: MarkKind) -> Self {
        self.mark_points.push(kind);
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: PatternScanConfig) -> Self {
        self.patterns = Some(patterns);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleOptions {
    pub text: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub position: TitlePosition,
    #[serde(default = "default_title_font_size")]
    pub font_size: f64,
}

impl TitleOptions {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subtitle: None,
            position: TitlePosition::Top,
            font_size: default_title_font_size(),
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: TitlePosition) -> Self {
        self.position = position;
        self
    }
}

fn default_title_font_size() -> f64 {
    18.0
}

/// Legend row drawn along the top edge, right-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            show: true,
            font_size: None,
        }
    }
}

/// Value axis settings; every numeric override is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxisOptions {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub label_count: Option<usize>,
    /// Suffix appended to every label, e.g. `%`.
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_padding_scale")]
    pub padding_scale: f64,
    #[serde(default = "default_true")]
    pub show: bool,
    /// Fixed number of decimals; derived from the tick step when unset.
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default = "default_true")]
    pub split_lines: bool,
}

impl Default for ValueAxisOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            label_count: None,
            unit: None,
            padding_scale: default_padding_scale(),
            show: true,
            precision: None,
            font_size: None,
            split_lines: true,
        }
    }
}

impl ValueAxisOptions {
    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_label_count(mut self, count: usize) -> Self {
        self.label_count = Some(count);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }
}

fn default_padding_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAxisOptions {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Label rotation in degrees, clockwise.
    #[serde(default)]
    pub label_rotation: f64,
}

impl Default for CategoryAxisOptions {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            show: true,
            font_size: None,
            label_rotation: 0.0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete description of one chart render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: Padding,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub stack_series: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub title: Option<TitleOptions>,
    #[serde(default)]
    pub legend: LegendOptions,
    #[serde(default = "default_value_axes")]
    pub value_axes: Vec<ValueAxisOptions>,
    #[serde(default)]
    pub category_axis: CategoryAxisOptions,
    #[serde(default)]
    pub series: Vec<SeriesOptions>,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_padding() -> Padding {
    Padding::uniform(10)
}

fn default_theme() -> String {
    DEFAULT_THEME.to_owned()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_value_axes() -> Vec<ValueAxisOptions> {
    vec![ValueAxisOptions::default()]
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: default_padding(),
            theme: default_theme(),
            stack_series: false,
            font_size: default_font_size(),
            title: None,
            legend: LegendOptions::default(),
            value_axes: default_value_axes(),
            category_axis: CategoryAxisOptions::default(),
            series: Vec::new(),
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parses options from JSON; serde failures map to
    /// [`ChartError::InvalidConfig`].
    pub fn from_json(input: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize chart options: {e}"))
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    #[must_use]
    pub fn with_stack_series(mut self, stack: bool) -> Self {
        self.stack_series = stack;
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: TitleOptions) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendOptions) -> Self {
        self.legend = legend;
        self
    }

    #[must_use]
    pub fn with_value_axes(mut self, axes: Vec<ValueAxisOptions>) -> Self {
        self.value_axes = axes;
        self
    }

    #[must_use]
    pub fn with_category_labels(mut self, labels: Vec<String>) -> Self {
        self.category_axis.labels = labels;
        self
    }

    #[must_use]
    pub fn with_series(mut self, series: SeriesOptions) -> Self {
        self.series.push(series);
        self
    }

    /// `true` when the chart draws horizontal bars, with the category axis
    /// on the left.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.series
            .iter()
            .any(|series| series.kind == SeriesKind::HorizontalBar)
    }

    /// Longest series length; the category axis has this many sections.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.series
            .iter()
            .map(|series| series.data.len())
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> ChartResult<()> {
        super::validation::validate_chart_options(self)
    }
}
