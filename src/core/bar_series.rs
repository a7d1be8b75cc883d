use serde::{Deserialize, Serialize};

use crate::core::AxisRange;

pub const DEFAULT_MARGIN_RATIO: f64 = 0.1;
pub const MIN_ITEM_WIDTH: i32 = 1;

/// How one category section is split between the series sharing it.
///
/// Layout inside a section, left to right: `group_margin`, then each item
/// separated by `item_margin`, then the trailing `group_margin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub group_margin: i32,
    pub item_margin: i32,
    pub item_width: i32,
}

impl SlotLayout {
    /// Pixel center of `series_index`'s item in the section that starts at
    /// `division_start`.
    ///
    /// Every overlay that aligns with bars or candles must go through this.
    #[must_use]
    pub fn center(self, division_start: i32, series_index: usize) -> f64 {
        f64::from(self.item_left(division_start, series_index))
            + f64::from(self.item_width) / 2.0
    }

    /// Left edge of `series_index`'s item.
    #[must_use]
    pub fn item_left(self, division_start: i32, series_index: usize) -> i32 {
        let index = i32::try_from(series_index).unwrap_or(i32::MAX);
        division_start
            + self.group_margin
            + index.saturating_mul(self.item_width + self.item_margin)
    }

    /// Total pixels used by margins and items for `series_count` series.
    #[must_use]
    pub fn occupied(self, series_count: usize) -> i32 {
        let count = i32::try_from(series_count.max(1)).unwrap_or(i32::MAX);
        2 * self.group_margin + count * self.item_width + (count - 1) * self.item_margin
    }
}

/// Splits a section of `section_width` pixels between `series_count` items.
///
/// A single series fills the whole section with no margins, unless
/// `desired_item_width` is narrower: then the item takes that width and is
/// centered. Several series get `margin_ratio` group margins, and a narrower
/// `desired_item_width` shrinks every item with the freed space moving into
/// the group margins. Dense sections drop margins before going below the
/// minimum item width.
#[must_use]
pub fn compute_slot(
    series_count: usize,
    section_width: i32,
    desired_item_width: Option<i32>,
    margin_ratio: f64,
) -> SlotLayout {
    let section = section_width.max(0);
    let count = i32::try_from(series_count.max(1)).unwrap_or(i32::MAX);
    let desired = desired_item_width.filter(|width| *width > 0);

    if count == 1 {
        let item_width = match desired {
            Some(width) if width < section => width,
            _ => section.max(MIN_ITEM_WIDTH),
        };
        return SlotLayout {
            group_margin: ((section - item_width) / 2).max(0),
            item_margin: 0,
            item_width,
        };
    }

    let ratio = if margin_ratio.is_finite() {
        margin_ratio.clamp(0.0, 0.45)
    } else {
        DEFAULT_MARGIN_RATIO
    };
    let mut group_margin = (f64::from(section) * ratio).floor() as i32;
    let mut item_margin = (group_margin / 2).max(1);
    let mut item_width = (section - 2 * group_margin - (count - 1) * item_margin) / count;

    if item_width < MIN_ITEM_WIDTH {
        // Dense data: give up margins before the items themselves.
        item_width = MIN_ITEM_WIDTH;
        item_margin = ((section - count * item_width) / (count - 1)).clamp(0, item_margin);
        group_margin = ((section - count * item_width - (count - 1) * item_margin) / 2).max(0);
        return SlotLayout {
            group_margin,
            item_margin,
            item_width,
        };
    }

    if let Some(width) = desired {
        if width < item_width {
            item_width = width;
            group_margin = (section - count * item_width - (count - 1) * item_margin) / 2;
        }
    }

    SlotLayout {
        group_margin,
        item_margin,
        item_width,
    }
}

/// Vertical bar rectangle in series-region pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BarGeometry {
    #[must_use]
    pub fn height(self) -> f64 {
        self.bottom - self.top
    }
}

/// Value where bars start: zero when the axis contains it, otherwise the
/// axis edge nearest to zero.
#[must_use]
pub fn bar_baseline(axis: &AxisRange) -> f64 {
    0.0_f64.clamp(axis.min.min(axis.max), axis.max.max(axis.min))
}

/// Projects one vertical bar.
///
/// `axis` maps values onto the series region height with larger values
/// higher up.
#[must_use]
pub fn project_bar(
    value: f64,
    division_start: i32,
    series_index: usize,
    slot: SlotLayout,
    axis: &AxisRange,
) -> BarGeometry {
    project_bar_between(
        bar_baseline(axis),
        value,
        division_start,
        series_index,
        slot,
        axis,
    )
}

/// Projects a vertical bar spanning `from..to`; stacked bars start where
/// the previous series ended.
#[must_use]
pub fn project_bar_between(
    from: f64,
    to: f64,
    division_start: i32,
    series_index: usize,
    slot: SlotLayout,
    axis: &AxisRange,
) -> BarGeometry {
    let left = f64::from(slot.item_left(division_start, series_index));
    let from_y = axis.value_to_pixel_inverted(from);
    let to_y = axis.value_to_pixel_inverted(to);
    BarGeometry {
        left,
        right: left + f64::from(slot.item_width),
        top: to_y.min(from_y),
        bottom: to_y.max(from_y),
    }
}

/// Projects one horizontal bar; the category runs down the y-axis and
/// `axis` maps values left to right.
#[must_use]
pub fn project_horizontal_bar(
    value: f64,
    division_start: i32,
    series_index: usize,
    slot: SlotLayout,
    axis: &AxisRange,
) -> BarGeometry {
    project_horizontal_bar_between(
        bar_baseline(axis),
        value,
        division_start,
        series_index,
        slot,
        axis,
    )
}

#[must_use]
pub fn project_horizontal_bar_between(
    from: f64,
    to: f64,
    division_start: i32,
    series_index: usize,
    slot: SlotLayout,
    axis: &AxisRange,
) -> BarGeometry {
    let top = f64::from(slot.item_left(division_start, series_index));
    let from_x = axis.value_to_pixel(from);
    let to_x = axis.value_to_pixel(to);
    BarGeometry {
        left: to_x.min(from_x),
        right: to_x.max(from_x),
        top,
        bottom: top + f64::from(slot.item_width),
    }
}
