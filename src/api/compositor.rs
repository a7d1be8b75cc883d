use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    AxisRange, RangeRequest, RegionBox, compute_range, nullable, stacked_extent, value_extent,
};
use crate::render::TextMeasurer;

use super::label_format::format_tick_labels;
use super::{
    ChartOptions, SeriesData, SeriesKind, SeriesOptions, TitlePosition, ValueAxisOptions,
};

/// Fixed band reserved under the series region for the category axis.
pub const CATEGORY_AXIS_HEIGHT: i32 = 30;
pub const TICK_LENGTH: i32 = 5;
pub const AXIS_LABEL_GAP: i32 = 4;
pub const LEGEND_SWATCH_SIZE: i32 = 14;
const LEGEND_SWATCH_TEXT_GAP: i32 = 4;
const LEGEND_ITEM_GAP: i32 = 12;
const LEGEND_ROW_GAP: i32 = 4;
const BAND_GAP: i32 = 8;
const SUBTITLE_SCALE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSide {
    Left,
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxisLayout {
    pub index: usize,
    pub side: AxisSide,
    pub range: AxisRange,
    pub labels: Vec<String>,
    pub bounds: RegionBox,
    pub show: bool,
    pub split_lines: bool,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAxisLayout {
    pub side: AxisSide,
    pub range: AxisRange,
    pub labels: Vec<String>,
    pub bounds: RegionBox,
    pub show: bool,
    pub font_size: f64,
    pub label_rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub series_index: usize,
    pub name: String,
    /// Absolute swatch box.
    pub swatch: RegionBox,
    pub text_x: f64,
    pub text_baseline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendLayout {
    pub bounds: RegionBox,
    pub items: Vec<LegendItem>,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleLayout {
    pub bounds: RegionBox,
    /// Widest of the title and subtitle lines, drawn from `bounds.left`.
    pub text_width: i32,
    pub text: String,
    pub subtitle: Option<String>,
    pub font_size: f64,
    pub subtitle_font_size: f64,
    pub position: TitlePosition,
}

/// Result of layout negotiation. All boxes are absolute pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesLayout {
    pub series_box: RegionBox,
    /// Ordered by axis index.
    pub value_axes: Vec<ValueAxisLayout>,
    pub category_axis: CategoryAxisLayout,
    pub legend: Option<LegendLayout>,
    pub title: Option<TitleLayout>,
    /// `true` when categories run down the left edge and values along the
    /// bottom.
    pub axis_reversed: bool,
}

impl SeriesLayout {
    #[must_use]
    pub fn value_axis(&self, index: usize) -> Option<&ValueAxisLayout> {
        self.value_axes.iter().find(|axis| axis.index == index)
    }

    #[must_use]
    pub fn category_divide_points(&self) -> &[i32] {
        &self.category_axis.range.divide_points
    }
}

/// Raw extent of every series drawn against `axis_index`.
///
/// Candles contribute their valid lows and highs. When `stacked`, value
/// series are summed per index. Bar families always include zero so bars
/// grow from the baseline.
#[must_use]
pub fn series_min_max(
    series: &[SeriesOptions],
    axis_index: usize,
    stacked: bool,
) -> Option<(f64, f64)> {
    let on_axis = || series.iter().filter(move |s| s.y_axis_index == axis_index);

    let candles = value_extent(on_axis().flat_map(|s| match &s.data {
        SeriesData::Ohlc(samples) => samples
            .iter()
            .filter(|sample| sample.is_valid())
            .flat_map(|sample| [sample.low, sample.high])
            .collect::<Vec<_>>(),
        SeriesData::Values(_) => Vec::new(),
    }));

    let columns: Vec<&[f64]> = on_axis()
        .filter_map(|s| match &s.data {
            SeriesData::Values(values) => Some(values.as_slice()),
            SeriesData::Ohlc(_) => None,
        })
        .collect();
    let values = if stacked {
        stacked_extent(&columns)
    } else {
        value_extent(columns.iter().flat_map(|column| column.iter().copied()))
    };

    let has_bars = on_axis().any(|s| matches!(s.kind, SeriesKind::Bar | SeriesKind::HorizontalBar));
    let zero = has_bars.then_some((0.0, 0.0));

    [candles, values, zero]
        .into_iter()
        .flatten()
        .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
}

fn has_fractional_values(series: &[SeriesOptions], axis_index: usize) -> bool {
    series
        .iter()
        .filter(|s| s.y_axis_index == axis_index)
        .any(|s| match &s.data {
            SeriesData::Values(values) => values
                .iter()
                .filter_map(|value| nullable(*value))
                .any(|value| value.fract() != 0.0),
            SeriesData::Ohlc(samples) => samples
                .iter()
                .filter(|sample| sample.is_valid())
                .any(|sample| {
                    [sample.open, sample.high, sample.low, sample.close]
                        .iter()
                        .any(|value| value.fract() != 0.0)
                }),
        })
}

fn resolve_value_axis(
    options: &ChartOptions,
    axis: &ValueAxisOptions,
    index: usize,
    size_px: i32,
) -> (AxisRange, Vec<String>) {
    let (min, max) = series_min_max(&options.series, index, options.stack_series)
        .unwrap_or((0.0, 1.0));
    let request = RangeRequest::new(min, max)
        .with_label_count_hint(axis.label_count)
        .with_padding_scale(axis.padding_scale, axis.padding_scale)
        .with_decimal_data(has_fractional_values(&options.series, index))
        .with_overrides(axis.min, axis.max);
    let range = AxisRange::value(compute_range(&request), size_px);
    let labels = format_tick_labels(&range.tick_values(), axis.precision, axis.unit.as_deref());
    (range, labels)
}

fn widest(labels: &[String], font_size: f64, measurer: &dyn TextMeasurer) -> f64 {
    labels
        .iter()
        .map(|label| measurer.measure(label, font_size).width)
        .fold(0.0, f64::max)
}

fn px(value: f64) -> i32 {
    if value.is_finite() {
        value.ceil().clamp(0.0, f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

fn category_labels(options: &ChartOptions) -> Vec<String> {
    if options.category_axis.labels.is_empty() {
        (0..options.category_count()).map(|i| i.to_string()).collect()
    } else {
        options.category_axis.labels.clone()
    }
}

/// Measured legend entries, before they are placed.
struct LegendMetrics {
    font_size: f64,
    row_height: i32,
    /// `(series_index, item_width)` in series order.
    entries: Vec<(usize, i32)>,
}

impl LegendMetrics {
    fn single_row_width(&self) -> i32 {
        self.entries.iter().map(|(_, width)| width).sum::<i32>()
            + LEGEND_ITEM_GAP * (self.entries.len().saturating_sub(1) as i32)
    }
}

fn measure_legend(options: &ChartOptions, measurer: &dyn TextMeasurer) -> Option<LegendMetrics> {
    if !options.legend.show || options.series.is_empty() {
        return None;
    }
    let font_size = options.legend.font_size.unwrap_or(options.font_size);
    let mut row_height = LEGEND_SWATCH_SIZE;
    let entries = options
        .series
        .iter()
        .enumerate()
        .map(|(series_index, series)| {
            let extent = measurer.measure(&series.name, font_size);
            row_height = row_height.max(px(extent.height));
            let item_width = LEGEND_SWATCH_SIZE + LEGEND_SWATCH_TEXT_GAP + px(extent.width);
            (series_index, item_width)
        })
        .collect();
    Some(LegendMetrics {
        font_size,
        row_height,
        entries,
    })
}

/// Wraps legend items into right-aligned rows starting at `area.top`.
fn layout_legend(area: RegionBox, metrics: &LegendMetrics, options: &ChartOptions) -> LegendLayout {
    let available = area.width();
    let mut rows: Vec<Vec<(usize, i32)>> = vec![Vec::new()];
    let mut row_width = 0;
    for &(series_index, item_width) in &metrics.entries {
        let needed = if row_width == 0 {
            item_width
        } else {
            row_width + LEGEND_ITEM_GAP + item_width
        };
        if needed > available && row_width > 0 {
            rows.push(Vec::new());
            row_width = item_width;
        } else {
            row_width = needed;
        }
        if let Some(row) = rows.last_mut() {
            row.push((series_index, item_width));
        }
    }

    let row_height = metrics.row_height;
    let font_size = metrics.font_size;
    let mut items = Vec::with_capacity(metrics.entries.len());
    let mut top = area.top;
    for row in &rows {
        let total: i32 = row.iter().map(|(_, width)| width).sum::<i32>()
            + LEGEND_ITEM_GAP * (row.len().saturating_sub(1) as i32);
        let mut x = (area.right - total).max(area.left);
        for &(series_index, item_width) in row {
            let swatch_top = top + (row_height - LEGEND_SWATCH_SIZE) / 2;
            items.push(LegendItem {
                series_index,
                name: options.series[series_index].name.clone(),
                swatch: RegionBox::new(
                    swatch_top,
                    x + LEGEND_SWATCH_SIZE,
                    swatch_top + LEGEND_SWATCH_SIZE,
                    x,
                ),
                text_x: f64::from(x + LEGEND_SWATCH_SIZE + LEGEND_SWATCH_TEXT_GAP),
                text_baseline: f64::from(top) + f64::from(row_height) / 2.0 + font_size * 0.35,
            });
            x += item_width + LEGEND_ITEM_GAP;
        }
        top += row_height + LEGEND_ROW_GAP;
    }

    let height = (top - LEGEND_ROW_GAP - area.top).max(0);
    LegendLayout {
        bounds: RegionBox::new(area.top, area.right, area.top + height, area.left),
        items,
        font_size,
    }
}

/// Puts the legend on the title's row when a single row fits to the right
/// of the title text. Otherwise the legend wraps under the title band.
fn place_legend(
    bounds: RegionBox,
    title: Option<&TitleLayout>,
    options: &ChartOptions,
    measurer: &dyn TextMeasurer,
) -> Option<LegendLayout> {
    if bounds.is_empty() {
        return None;
    }
    let metrics = measure_legend(options, measurer)?;
    let Some(title) = title.filter(|title| title.position == TitlePosition::Top) else {
        return Some(layout_legend(bounds, &metrics, options));
    };

    let beside_left = (title.bounds.left + title.text_width + LEGEND_ITEM_GAP).min(bounds.right);
    let beside = RegionBox::new(bounds.top, bounds.right, bounds.bottom, beside_left);
    if metrics.single_row_width() <= beside.width() {
        return Some(layout_legend(beside, &metrics, options));
    }
    let below = RegionBox::new(
        (title.bounds.bottom + BAND_GAP).min(bounds.bottom),
        bounds.right,
        bounds.bottom,
        bounds.left,
    );
    Some(layout_legend(below, &metrics, options))
}

fn layout_title(
    bounds: RegionBox,
    options: &ChartOptions,
    measurer: &dyn TextMeasurer,
) -> Option<TitleLayout> {
    let title = options.title.as_ref().filter(|title| !title.text.is_empty())?;
    let subtitle_font_size = title.font_size * SUBTITLE_SCALE;
    let extent = measurer.measure(&title.text, title.font_size);
    let (mut width, mut height) = (extent.width, extent.height);
    if let Some(subtitle) = title.subtitle.as_deref().filter(|s| !s.is_empty()) {
        let extent = measurer.measure(subtitle, subtitle_font_size);
        width = width.max(extent.width);
        height += extent.height;
    }
    let height = px(height);
    let bounds = match title.position {
        TitlePosition::Top => {
            RegionBox::new(bounds.top, bounds.right, bounds.top + height, bounds.left)
        }
        TitlePosition::Bottom => RegionBox::new(
            bounds.bottom - height,
            bounds.right,
            bounds.bottom,
            bounds.left,
        ),
    };
    Some(TitleLayout {
        bounds,
        text_width: px(width),
        text: title.text.clone(),
        subtitle: title.subtitle.clone().filter(|s| !s.is_empty()),
        font_size: title.font_size,
        subtitle_font_size,
        position: title.position,
    })
}

/// Negotiates every band inside `bounds` and returns the series region.
///
/// Order: title, legend, value axes in reverse index order, the category
/// band, then whatever remains goes to the series. Degenerate sizes
/// collapse to empty boxes.
#[must_use]
pub fn compose(
    bounds: RegionBox,
    options: &ChartOptions,
    measurer: &dyn TextMeasurer,
) -> SeriesLayout {
    let title = layout_title(bounds, options, measurer);
    let legend = place_legend(bounds, title.as_ref(), options, measurer);

    let top_title = title
        .as_ref()
        .filter(|title| title.position == TitlePosition::Top);
    let top_band = legend
        .as_ref()
        .map(|legend| legend.bounds.bottom)
        .into_iter()
        .chain(top_title.map(|title| title.bounds.bottom))
        .max()
        .map_or(0, |edge| edge - bounds.top + BAND_GAP);
    let bottom_band = title
        .as_ref()
        .filter(|title| title.position == TitlePosition::Bottom)
        .map_or(0, |title| title.bounds.height() + BAND_GAP);
    let content = RegionBox::new(
        (bounds.top + top_band).min(bounds.bottom),
        bounds.right,
        (bounds.bottom - bottom_band).max(bounds.top),
        bounds.left,
    );
    debug!(
        top_band,
        bottom_band,
        content_width = content.width(),
        content_height = content.height(),
        "reserved legend/title bands"
    );

    let layout = if options.is_horizontal() {
        compose_horizontal(content, options, measurer)
    } else {
        compose_vertical(content, options, measurer)
    };

    SeriesLayout {
        legend,
        title,
        ..layout
    }
}

fn axis_options(options: &ChartOptions) -> Vec<ValueAxisOptions> {
    if options.value_axes.is_empty() {
        vec![ValueAxisOptions::default()]
    } else {
        options.value_axes.clone()
    }
}

fn compose_vertical(
    content: RegionBox,
    options: &ChartOptions,
    measurer: &dyn TextMeasurer,
) -> SeriesLayout {
    let category_band = if options.category_axis.show {
        CATEGORY_AXIS_HEIGHT.min(content.height())
    } else {
        0
    };
    let series_height = (content.height() - category_band).max(0);

    let axes = axis_options(options);
    let mut left_margin = 0;
    let mut right_margin = 0;
    let mut resolved = Vec::with_capacity(axes.len());
    for (index, axis) in axes.iter().enumerate().rev() {
        let (range, labels) = resolve_value_axis(options, axis, index, series_height);
        let font_size = axis.font_size.unwrap_or(options.font_size);
        let width = if axis.show {
            px(widest(&labels, font_size, measurer)) + TICK_LENGTH + AXIS_LABEL_GAP
        } else {
            0
        };
        let side = if index == 0 {
            left_margin += width;
            AxisSide::Left
        } else {
            right_margin += width;
            AxisSide::Right
        };
        debug!(
            axis = index,
            width,
            min = range.min,
            max = range.max,
            label_count = range.label_count,
            "value axis negotiated"
        );
        resolved.push((index, side, width, range, labels, axis, font_size));
    }

    // Keep at least one pixel column for the series when axes are too wide.
    let available = content.width();
    if left_margin + right_margin >= available {
        let scale = f64::from(available.max(1) - 1) / f64::from((left_margin + right_margin).max(1));
        left_margin = (f64::from(left_margin) * scale).floor() as i32;
        right_margin = (f64::from(right_margin) * scale).floor() as i32;
    }

    let series_box = RegionBox::new(
        content.top,
        content.right - right_margin,
        content.top + series_height,
        content.left + left_margin,
    );
    debug!(
        left = series_box.left,
        top = series_box.top,
        width = series_box.width(),
        height = series_box.height(),
        "series region"
    );

    let mut value_axes: Vec<ValueAxisLayout> = resolved
        .into_iter()
        .map(|(index, side, width, range, labels, axis, font_size)| {
            let bounds = match side {
                AxisSide::Right => RegionBox::new(
                    series_box.top,
                    (series_box.right + width).min(content.right),
                    series_box.bottom,
                    series_box.right,
                ),
                _ => RegionBox::new(
                    series_box.top,
                    series_box.left,
                    series_box.bottom,
                    (series_box.left - width).max(content.left),
                ),
            };
            ValueAxisLayout {
                index,
                side,
                range,
                labels,
                bounds,
                show: axis.show,
                split_lines: axis.split_lines,
                font_size,
            }
        })
        .collect();
    value_axes.sort_by_key(|axis| axis.index);

    let category_axis = CategoryAxisLayout {
        side: AxisSide::Bottom,
        range: AxisRange::category(options.category_count(), series_box.width()),
        labels: category_labels(options),
        bounds: RegionBox::new(
            series_box.bottom,
            series_box.right,
            series_box.bottom + category_band,
            series_box.left,
        ),
        show: options.category_axis.show,
        font_size: options.category_axis.font_size.unwrap_or(options.font_size),
        label_rotation: options.category_axis.label_rotation,
    };

    SeriesLayout {
        series_box,
        value_axes,
        category_axis,
        legend: None,
        title: None,
        axis_reversed: false,
    }
}

fn compose_horizontal(
    content: RegionBox,
    options: &ChartOptions,
    measurer: &dyn TextMeasurer,
) -> SeriesLayout {
    let axes = axis_options(options);
    let axis = &axes[0];
    let value_font = axis.font_size.unwrap_or(options.font_size);
    let value_band = if axis.show {
        CATEGORY_AXIS_HEIGHT.min(content.height())
    } else {
        0
    };

    let labels = category_labels(options);
    let category_font = options.category_axis.font_size.unwrap_or(options.font_size);
    let category_width = if options.category_axis.show {
        px(widest(&labels, category_font, measurer)) + TICK_LENGTH + AXIS_LABEL_GAP
    } else {
        0
    }
    .min((content.width() - 1).max(0));

    // Label text does not depend on pixel size, so the trailing half-label
    // overhang is known before the series width is.
    let (_, probe_labels) = resolve_value_axis(options, axis, 0, 0);
    let overhang = if axis.show {
        probe_labels
            .last()
            .map_or(0, |label| px(measurer.measure(label, value_font).width / 2.0))
    } else {
        0
    }
    .min((content.width() - category_width - 1).max(0));

    let series_box = RegionBox::new(
        content.top,
        content.right - overhang,
        (content.bottom - value_band).max(content.top),
        content.left + category_width,
    );
    let (range, value_labels) = resolve_value_axis(options, axis, 0, series_box.width());
    debug!(
        category_width,
        value_band,
        min = range.min,
        max = range.max,
        width = series_box.width(),
        height = series_box.height(),
        "horizontal series region"
    );

    let value_axis = ValueAxisLayout {
        index: 0,
        side: AxisSide::Bottom,
        range,
        labels: value_labels,
        bounds: RegionBox::new(
            series_box.bottom,
            series_box.right,
            series_box.bottom + value_band,
            series_box.left,
        ),
        show: axis.show,
        split_lines: axis.split_lines,
        font_size: value_font,
    };

    let category_axis = CategoryAxisLayout {
        side: AxisSide::Left,
        range: AxisRange::category(options.category_count(), series_box.height()),
        labels,
        bounds: RegionBox::new(
            series_box.top,
            series_box.left,
            series_box.bottom,
            content.left,
        ),
        show: options.category_axis.show,
        font_size: category_font,
        label_rotation: 0.0,
    };

    SeriesLayout {
        series_box,
        value_axes: vec![value_axis],
        category_axis,
        legend: None,
        title: None,
        axis_reversed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::{has_fractional_values, px};
    use crate::api::SeriesOptions;

    #[test]
    fn px_rounds_up_and_rejects_garbage() {
        assert_eq!(px(10.2), 11);
        assert_eq!(px(-3.0), 0);
        assert_eq!(px(f64::NAN), 0);
    }

    #[test]
    fn fractional_detection_is_per_axis() {
        let series = vec![
            SeriesOptions::line("a", vec![1.0, 2.0]),
            SeriesOptions::line("b", vec![1.5]).with_y_axis_index(1),
        ];
        assert!(!has_fractional_values(&series, 0));
        assert!(has_fractional_values(&series, 1));
    }
}
