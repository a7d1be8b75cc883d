use crate::core::AxisRange;
use crate::render::{Palette, Region, TextHAlign, TextMeasurer};

use super::compositor::{
    AXIS_LABEL_GAP, AxisSide, CategoryAxisLayout, SeriesLayout, TICK_LENGTH, ValueAxisLayout,
};

const AXIS_STROKE_WIDTH: f64 = 1.0;
const SPLIT_STROKE_WIDTH: f64 = 1.0;
const MIN_LABEL_SPACING: f64 = 4.0;
/// Approximate distance from a text's vertical center to its baseline, as a
/// fraction of the font size.
pub(super) const BASELINE_SHIFT: f64 = 0.35;

/// Every `n`-th category label is drawn so neighbours never overlap.
#[must_use]
pub fn label_stride(section_px: f64, widest_label_px: f64) -> usize {
    if section_px <= 0.0 || !section_px.is_finite() {
        return 1;
    }
    let needed = (widest_label_px + MIN_LABEL_SPACING) / section_px;
    if needed.is_finite() && needed > 1.0 {
        needed.ceil() as usize
    } else {
        1
    }
}

/// Grid lines of the primary value axis, drawn behind the series.
pub(super) fn draw_split_lines(region: &mut Region<'_>, layout: &SeriesLayout, palette: &dyn Palette) {
    let Some(axis) = layout.value_axis(0).filter(|axis| axis.split_lines) else {
        return;
    };
    region.set_stroke(palette.grid_color(), SPLIT_STROKE_WIDTH);
    let width = f64::from(region.width());
    let height = f64::from(region.height());
    // Skip the baseline; the axis line covers it.
    for point in axis.range.divide_points.iter().skip(1) {
        let offset = f64::from(*point);
        if layout.axis_reversed {
            region.line_segment(offset, 0.0, offset, height);
        } else {
            region.line_segment(0.0, height - offset, width, height - offset);
        }
    }
}

pub(super) fn draw_value_axis(
    region: &mut Region<'_>,
    axis: &ValueAxisLayout,
    palette: &dyn Palette,
) {
    if !axis.show {
        return;
    }
    region.set_stroke(palette.axis_color(), AXIS_STROKE_WIDTH);
    region.set_font(palette.text_color(), axis.font_size);
    let width = f64::from(region.width());
    let height = f64::from(region.height());
    let tick = f64::from(TICK_LENGTH);
    let gap = f64::from(TICK_LENGTH + AXIS_LABEL_GAP);
    let shift = axis.font_size * BASELINE_SHIFT;

    match axis.side {
        AxisSide::Left => {
            region.line_segment(width, 0.0, width, height);
            for (point, label) in axis.range.divide_points.iter().zip(&axis.labels) {
                let y = height - f64::from(*point);
                region.line_segment(width - tick, y, width, y);
                region.text(label, width - gap, y + shift, TextHAlign::Right);
            }
        }
        AxisSide::Right => {
            region.line_segment(0.0, 0.0, 0.0, height);
            for (point, label) in axis.range.divide_points.iter().zip(&axis.labels) {
                let y = height - f64::from(*point);
                region.line_segment(0.0, y, tick, y);
                region.text(label, gap, y + shift, TextHAlign::Left);
            }
        }
        AxisSide::Bottom => {
            region.line_segment(0.0, 0.0, width, 0.0);
            for (point, label) in axis.range.divide_points.iter().zip(&axis.labels) {
                let x = f64::from(*point);
                region.line_segment(x, 0.0, x, tick);
                region.text(label, x, gap + axis.font_size, TextHAlign::Center);
            }
        }
    }
}

fn section_center(range: &AxisRange, index: usize) -> Option<f64> {
    let start = *range.divide_points.get(index)?;
    let end = *range.divide_points.get(index + 1)?;
    Some(f64::from(start + end) / 2.0)
}

pub(super) fn draw_category_axis(
    region: &mut Region<'_>,
    axis: &CategoryAxisLayout,
    palette: &dyn Palette,
    measurer: &dyn TextMeasurer,
) {
    if !axis.show {
        return;
    }
    region.set_stroke(palette.axis_color(), AXIS_STROKE_WIDTH);
    region.set_font(palette.text_color(), axis.font_size);
    let width = f64::from(region.width());
    let height = f64::from(region.height());
    let tick = f64::from(TICK_LENGTH);
    let gap = f64::from(TICK_LENGTH + AXIS_LABEL_GAP);
    let shift = axis.font_size * BASELINE_SHIFT;

    let section = if axis.range.divide_count() == 0 {
        0.0
    } else {
        f64::from(axis.range.size_px) / axis.range.divide_count() as f64
    };

    match axis.side {
        AxisSide::Left => {
            region.line_segment(width, 0.0, width, height);
            for point in &axis.range.divide_points {
                let y = f64::from(*point);
                region.line_segment(width - tick, y, width, y);
            }
            let tallest = axis
                .labels
                .iter()
                .map(|label| measurer.measure(label, axis.font_size).height)
                .fold(0.0, f64::max);
            let stride = label_stride(section, tallest);
            for (index, label) in axis.labels.iter().enumerate().step_by(stride) {
                if let Some(y) = section_center(&axis.range, index) {
                    region.text(label, width - gap, y + shift, TextHAlign::Right);
                }
            }
        }
        AxisSide::Right | AxisSide::Bottom => {
            region.line_segment(0.0, 0.0, width, 0.0);
            for point in &axis.range.divide_points {
                let x = f64::from(*point);
                region.line_segment(x, 0.0, x, tick);
            }
            let widest = axis
                .labels
                .iter()
                .map(|label| {
                    measurer
                        .measure(label, axis.font_size)
                        .rotated(axis.label_rotation)
                        .width
                })
                .fold(0.0, f64::max);
            let stride = label_stride(section, widest);
            let (align, degrees) = if axis.label_rotation == 0.0 {
                (TextHAlign::Center, 0.0)
            } else {
                (TextHAlign::Right, axis.label_rotation)
            };
            for (index, label) in axis.labels.iter().enumerate().step_by(stride) {
                if let Some(x) = section_center(&axis.range, index) {
                    region.text_rotated(label, x, gap + axis.font_size, align, degrees);
                }
            }
        }
    }
}
