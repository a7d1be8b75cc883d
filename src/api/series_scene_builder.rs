use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    AxisRange, CandleBody, DEFAULT_MARGIN_RATIO, LinePlacement, LineRun, OhlcSample, Point,
    SlotLayout, bar_baseline, compute_slot, nullable, project_bar_between, project_candle,
    project_horizontal_bar_between, project_optional_runs,
};
use crate::error::ChartResult;
use crate::extensions::{
    Annotation, AnnotationPlacementConfig, AnnotationSide, MarkKind, TrendLineKind, fit_trends,
    mark_point, mark_value, ohlc_mark_values, pattern_annotations, place_annotations,
    scan_patterns,
};
use crate::render::{Color, Palette, Region, TextHAlign, TextMeasurer};

use super::axis_scene_builder::BASELINE_SHIFT;
use super::compositor::{SeriesLayout, ValueAxisLayout};
use super::label_format::{format_axis_value, precision_for_step};
use super::{ChartOptions, SeriesData, SeriesKind, SeriesOptions};

const TREND_STROKE_WIDTH: f64 = 1.5;
const TREND_ALPHA: f64 = 0.8;
const MARK_LINE_ALPHA: f64 = 0.6;
const MARK_PIN_HALF_WIDTH: f64 = 5.0;
const MARK_PIN_HEIGHT: f64 = 8.0;
const LONE_POINT_SIZE: f64 = 3.0;
const ANNOTATION_FONT_SCALE: f64 = 0.8;

/// Slot assignment shared by every slotted series on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPlan {
    pub layout: SlotLayout,
    /// Number of distinct slots per category section.
    pub count: usize,
    slot_of: Vec<Option<usize>>,
}

impl SlotPlan {
    /// Slot index of `series_index`, or `None` for series drawn at the
    /// section center.
    #[must_use]
    pub fn slot(&self, series_index: usize) -> Option<usize> {
        self.slot_of.get(series_index).copied().flatten()
    }

    #[must_use]
    pub fn placement(&self, series_index: usize) -> LinePlacement {
        match self.slot(series_index) {
            Some(series_index) => LinePlacement::Slot {
                layout: self.layout,
                series_index,
            },
            None => LinePlacement::SectionCenter,
        }
    }
}

/// Assigns slots to bar and candle series.
///
/// Stacked bars share one slot. The narrowest requested bar width and the
/// first slotted series' margin ratio apply to the whole group.
#[must_use]
pub fn plan_slots(options: &ChartOptions, divide_points: &[i32]) -> SlotPlan {
    let mut slot_of = Vec::with_capacity(options.series.len());
    let mut count = 0;
    let mut shared_bar_slot = None;
    for series in &options.series {
        let slot = if !series.kind.is_slotted() {
            None
        } else if options.stack_series && series.kind != SeriesKind::Candlestick {
            Some(*shared_bar_slot.get_or_insert_with(|| {
                count += 1;
                count - 1
            }))
        } else {
            count += 1;
            Some(count - 1)
        };
        slot_of.push(slot);
    }

    let slotted = || options.series.iter().filter(|s| s.kind.is_slotted());
    let desired = slotted().filter_map(|s| s.style.bar_width).min();
    let margin_ratio = slotted()
        .map(|s| s.style.margin_ratio)
        .next()
        .unwrap_or(DEFAULT_MARGIN_RATIO);
    let section = divide_points
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .min()
        .unwrap_or(0);

    SlotPlan {
        layout: compute_slot(count.max(1), section, desired, margin_ratio),
        count,
        slot_of,
    }
}

/// Running positive/negative totals per category for stacked series.
///
/// Lines and bars share the buckets, so a stacked line point sits on the
/// edge of the matching bar segment rather than on the net sum.
type StackTotals = Vec<(f64, f64)>;

/// `(from, to)` value span per index; `None` where the value is absent.
fn value_spans(
    values: &[f64],
    baseline: f64,
    stack: Option<&mut StackTotals>,
) -> Vec<Option<(f64, f64)>> {
    match stack {
        None => values
            .iter()
            .map(|value| nullable(*value).map(|value| (baseline, value)))
            .collect(),
        Some(totals) => values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let value = nullable(*value)?;
                let (positive, negative) = totals.get_mut(index)?;
                let total = if value >= 0.0 { positive } else { negative };
                let from = *total;
                *total += value;
                Some((from, *total))
            })
            .collect(),
    }
}

/// Maps runs projected for a vertical chart onto a horizontal one, where
/// categories run down and values run right.
fn orient(runs: Vec<LineRun>, horizontal: bool, axis: &AxisRange) -> Vec<LineRun> {
    if !horizontal {
        return runs;
    }
    let size = f64::from(axis.size_px);
    runs.into_iter()
        .map(|run| {
            run.into_iter()
                .map(|point| Point::new(size - point.y, point.x))
                .collect()
        })
        .collect()
}

fn draw_runs(region: &mut Region<'_>, runs: &[LineRun], color: Color, width: f64) {
    region.set_stroke(color, width);
    for run in runs {
        if let [point] = run.as_slice() {
            region.set_fill(color);
            let half = LONE_POINT_SIZE / 2.0;
            region.rect(point.x - half, point.y - half, LONE_POINT_SIZE, LONE_POINT_SIZE);
        } else {
            region.line(run);
        }
    }
}

pub(super) struct SeriesSceneBuilder<'a> {
    pub(super) options: &'a ChartOptions,
    pub(super) layout: &'a SeriesLayout,
    pub(super) palette: &'a dyn Palette,
    pub(super) measurer: &'a dyn TextMeasurer,
}

impl SeriesSceneBuilder<'_> {
    fn series_color(&self, index: usize, series: &SeriesOptions) -> Color {
        series
            .style
            .color
            .unwrap_or_else(|| self.palette.series_color(index))
    }

    fn axis_precision(&self, axis: &ValueAxisLayout) -> u32 {
        self.options
            .value_axes
            .get(axis.index)
            .and_then(|options| options.precision)
            .unwrap_or_else(|| {
                let steps = axis.range.label_count.max(2) - 1;
                precision_for_step((axis.range.max - axis.range.min) / steps as f64)
            })
    }

    fn axis_unit(&self, axis: &ValueAxisLayout) -> Option<&str> {
        self.options
            .value_axes
            .get(axis.index)
            .and_then(|options| options.unit.as_deref())
    }

    /// Draws every series body, then overlays, then pattern annotations.
    pub(super) fn build(&self, region: &mut Region<'_>) -> ChartResult<()> {
        let divide_points = self.layout.category_divide_points();
        let slots = plan_slots(self.options, divide_points);
        let horizontal = self.layout.axis_reversed;
        let categories = self.options.category_count();
        let mut stacks: Vec<StackTotals> = (0..self.layout.value_axes.len().max(1))
            .map(|_| vec![(0.0, 0.0); categories])
            .collect();

        for (index, series) in self.options.series.iter().enumerate() {
            let Some(axis) = self.layout.value_axis(series.y_axis_index) else {
                continue;
            };
            let color = self.series_color(index, series);
            match (&series.data, series.kind) {
                (SeriesData::Values(values), SeriesKind::Line) => {
                    let stack = if self.options.stack_series {
                        stacks.get_mut(series.y_axis_index)
                    } else {
                        None
                    };
                    let tops = value_spans(values, 0.0, stack)
                        .into_iter()
                        .map(|span| span.map(|(_, to)| to));
                    let runs = project_optional_runs(
                        tops,
                        divide_points,
                        slots.placement(index),
                        &axis.range,
                    );
                    draw_runs(
                        region,
                        &orient(runs, horizontal, &axis.range),
                        color,
                        series.style.stroke_width,
                    );
                }
                (SeriesData::Values(values), SeriesKind::Bar | SeriesKind::HorizontalBar) => {
                    let stack = if self.options.stack_series {
                        stacks.get_mut(series.y_axis_index)
                    } else {
                        None
                    };
                    let spans = value_spans(values, bar_baseline(&axis.range), stack);
                    self.draw_bars(
                        region,
                        &spans,
                        slots.slot(index).unwrap_or(0),
                        slots.layout,
                        axis,
                        color,
                    );
                }
                (SeriesData::Ohlc(samples), SeriesKind::Candlestick) => {
                    self.draw_candles(
                        region,
                        samples,
                        slots.slot(index).unwrap_or(0),
                        slots.layout,
                        axis,
                        series.style.color,
                    );
                }
                // Rejected by validation.
                _ => {}
            }
        }

        self.draw_trend_lines(region, &slots);
        self.draw_marks(region, &slots);
        self.draw_pattern_annotations(region, &slots)
    }

    fn draw_bars(
        &self,
        region: &mut Region<'_>,
        spans: &[Option<(f64, f64)>],
        slot: usize,
        layout: SlotLayout,
        axis: &ValueAxisLayout,
        color: Color,
    ) {
        let divide_points = self.layout.category_divide_points();
        region.set_stroke(Color::TRANSPARENT, 0.0);
        region.set_fill(color);
        for (index, span) in spans.iter().enumerate() {
            let (Some((from, to)), Some(start)) = (span, divide_points.get(index)) else {
                continue;
            };
            let bar = if self.layout.axis_reversed {
                project_horizontal_bar_between(*from, *to, *start, slot, layout, &axis.range)
            } else {
                project_bar_between(*from, *to, *start, slot, layout, &axis.range)
            };
            region.rect(bar.left, bar.top, bar.right - bar.left, bar.bottom - bar.top);
        }
    }

    fn draw_candles(
        &self,
        region: &mut Region<'_>,
        samples: &[OhlcSample],
        slot: usize,
        layout: SlotLayout,
        axis: &ValueAxisLayout,
        color_override: Option<Color>,
    ) {
        let divide_points = self.layout.category_divide_points();
        let mut skipped = 0usize;
        for (index, sample) in samples.iter().enumerate() {
            let Some(start) = divide_points.get(index) else {
                break;
            };
            let Some(candle) = project_candle(*sample, *start, slot, layout, &axis.range) else {
                skipped += 1;
                continue;
            };
            let color = color_override.unwrap_or_else(|| {
                if candle.is_bullish {
                    self.palette.up_color()
                } else {
                    self.palette.down_color()
                }
            });
            region.set_stroke(color, 1.0);
            region.line_segment(
                candle.center_x,
                candle.wick_top,
                candle.center_x,
                candle.wick_bottom,
            );
            match candle.body {
                CandleBody::Rect {
                    left,
                    right,
                    top,
                    bottom,
                } => {
                    region.set_fill(color);
                    region.rect(left, top, right - left, bottom - top);
                }
                CandleBody::Line { left, right, y } => {
                    region.line_segment(left, y, right, y);
                }
            }
            for cap in [candle.upper_cap, candle.lower_cap].into_iter().flatten() {
                region.line_segment(cap.left, cap.y, cap.right, cap.y);
            }
        }
        if skipped > 0 {
            debug!(skipped, "candles without valid geometry");
        }
    }

    fn draw_trend_lines(&self, region: &mut Region<'_>, slots: &SlotPlan) {
        let divide_points = self.layout.category_divide_points();
        let sources: Vec<(usize, Vec<f64>)> = self
            .options
            .series
            .iter()
            .enumerate()
            .filter(|(_, series)| !series.trend_lines.is_empty())
            .map(|(index, series)| (index, series.data.fit_values()))
            .collect();
        let mut owners: Vec<(usize, TrendLineKind)> = Vec::new();
        let mut requests: Vec<(&[f64], TrendLineKind)> = Vec::new();
        for (index, values) in &sources {
            for kind in &self.options.series[*index].trend_lines {
                owners.push((*index, *kind));
                requests.push((values.as_slice(), *kind));
            }
        }
        if requests.is_empty() {
            return;
        }

        for ((index, kind), fitted) in owners.into_iter().zip(fit_trends(&requests)) {
            let series = &self.options.series[index];
            let fitted = match fitted {
                Ok(fitted) => fitted,
                Err(err) => {
                    warn!(series = %series.name, trend = kind.label(), %err, "skip trend overlay");
                    continue;
                }
            };
            let Some(axis) = self.layout.value_axis(series.y_axis_index) else {
                continue;
            };
            let runs = project_optional_runs(
                fitted,
                divide_points,
                slots.placement(index),
                &axis.range,
            );
            let color = self.series_color(index, series).with_alpha(TREND_ALPHA);
            draw_runs(
                region,
                &orient(runs, self.layout.axis_reversed, &axis.range),
                color,
                TREND_STROKE_WIDTH,
            );
        }
    }

    fn mark_values(series: &SeriesOptions, kind: MarkKind) -> Vec<f64> {
        match &series.data {
            SeriesData::Values(values) => values.clone(),
            SeriesData::Ohlc(samples) => ohlc_mark_values(samples, kind),
        }
    }

    fn draw_marks(&self, region: &mut Region<'_>, slots: &SlotPlan) {
        let divide_points = self.layout.category_divide_points();
        let width = f64::from(region.width());
        let height = f64::from(region.height());
        let horizontal = self.layout.axis_reversed;
        let font_size = self.options.font_size * ANNOTATION_FONT_SCALE;

        for (index, series) in self.options.series.iter().enumerate() {
            let Some(axis) = self.layout.value_axis(series.y_axis_index) else {
                continue;
            };
            let color = self.series_color(index, series);
            let precision = self.axis_precision(axis);
            let unit = self.axis_unit(axis);

            for kind in &series.mark_lines {
                let Some(value) = mark_value(&Self::mark_values(series, *kind), *kind) else {
                    continue;
                };
                let text = format!("{} {}", kind.label(), format_axis_value(value, precision, unit));
                region.set_stroke(color.with_alpha(MARK_LINE_ALPHA), 1.0);
                region.set_font(color, font_size);
                if horizontal {
                    let x = axis.range.value_to_pixel(value);
                    region.line_segment(x, 0.0, x, height);
                    region.text(&text, x, font_size, TextHAlign::Center);
                } else {
                    let y = axis.range.value_to_pixel_inverted(value);
                    region.line_segment(0.0, y, width, y);
                    region.text(&text, width - 2.0, y - 3.0, TextHAlign::Right);
                }
            }

            for kind in &series.mark_points {
                let Some(point) = mark_point(&Self::mark_values(series, *kind), *kind) else {
                    continue;
                };
                let Some(category) = slots.placement(index).x(divide_points, point.index) else {
                    continue;
                };
                let (x, y) = if horizontal {
                    (axis.range.value_to_pixel(point.value), category)
                } else {
                    (category, axis.range.value_to_pixel_inverted(point.value))
                };
                region.set_stroke(Color::TRANSPARENT, 0.0);
                region.set_fill(color);
                region.polygon(&[
                    Point::new(x, y),
                    Point::new(x - MARK_PIN_HALF_WIDTH, y - MARK_PIN_HEIGHT),
                    Point::new(x + MARK_PIN_HALF_WIDTH, y - MARK_PIN_HEIGHT),
                ]);
                region.set_font(color, font_size);
                region.text(
                    &format_axis_value(point.value, precision, unit),
                    x,
                    y - MARK_PIN_HEIGHT - 2.0,
                    TextHAlign::Center,
                );
            }
        }
    }

    fn draw_pattern_annotations(
        &self,
        region: &mut Region<'_>,
        slots: &SlotPlan,
    ) -> ChartResult<()> {
        let divide_points = self.layout.category_divide_points();
        let mut annotations: Vec<Annotation> = Vec::new();
        for (index, series) in self.options.series.iter().enumerate() {
            let (Some(config), SeriesData::Ohlc(samples)) = (&series.patterns, &series.data) else {
                continue;
            };
            let Some(axis) = self.layout.value_axis(series.y_axis_index) else {
                continue;
            };
            let scan = scan_patterns(samples, config);
            debug!(series = %series.name, detections = scan.total(), "pattern scan");
            annotations.extend(pattern_annotations(
                &scan,
                samples,
                divide_points,
                slots.layout,
                slots.slot(index).unwrap_or(0),
                &axis.range,
            ));
        }
        if annotations.is_empty() {
            return Ok(());
        }

        let config = AnnotationPlacementConfig {
            font_size_px: self.options.font_size * ANNOTATION_FONT_SCALE,
            ..AnnotationPlacementConfig::default()
        };
        let placed = place_annotations(
            &annotations,
            f64::from(region.width()),
            self.measurer,
            config,
        )?;

        let half = config.marker_size_px / 2.0;
        region.set_stroke(Color::TRANSPARENT, 0.0);
        for annotation in &placed {
            let color = match annotation.side {
                AnnotationSide::Below => self.palette.up_color(),
                AnnotationSide::Above => self.palette.down_color(),
            };
            region.set_fill(color);
            let (tip, base) = match annotation.side {
                AnnotationSide::Above => (annotation.y + half, annotation.y - half),
                AnnotationSide::Below => (annotation.y - half, annotation.y + half),
            };
            region.polygon(&[
                Point::new(annotation.x, tip),
                Point::new(annotation.x - half, base),
                Point::new(annotation.x + half, base),
            ]);
            region.set_font(self.palette.text_color(), config.font_size_px);
            region.text(
                &annotation.text,
                annotation.x,
                annotation.label.top_px
                    + annotation.label.height_px / 2.0
                    + config.font_size_px * BASELINE_SHIFT,
                TextHAlign::Center,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{StackTotals, value_spans};
    use crate::core::NULL_VALUE;

    #[test]
    fn stacked_spans_split_by_sign() {
        let mut totals: StackTotals = vec![(0.0, 0.0); 3];
        let first = value_spans(&[2.0, -1.0, NULL_VALUE], 0.0, Some(&mut totals));
        let second = value_spans(&[3.0, -2.0, 4.0], 0.0, Some(&mut totals));
        assert_eq!(first, vec![Some((0.0, 2.0)), Some((0.0, -1.0)), None]);
        assert_eq!(second, vec![Some((2.0, 5.0)), Some((-1.0, -3.0)), Some((0.0, 4.0))]);
    }

    #[test]
    fn stacked_line_tops_land_on_their_sign_bucket() {
        let mut totals: StackTotals = vec![(0.0, 0.0); 2];
        let _bars = value_spans(&[4.0, 4.0], 0.0, Some(&mut totals));
        let line: Vec<_> = value_spans(&[-1.0, 2.0], 0.0, Some(&mut totals))
            .into_iter()
            .map(|span| span.map(|(_, to)| to))
            .collect();
        // A net total would put the first point at 3.0.
        assert_eq!(line, vec![Some(-1.0), Some(6.0)]);
    }

    #[test]
    fn unstacked_spans_start_at_baseline() {
        let spans = value_spans(&[5.0, NULL_VALUE], 1.0, None);
        assert_eq!(spans, vec![Some((1.0, 5.0)), None]);
    }
}
