use serde::{Deserialize, Serialize};

use crate::core::primitives::nullable;
use crate::core::{AxisRange, Point, SlotLayout};

/// Connected run of points; absent samples end a run.
pub type LineRun = Vec<Point>;

/// Which positioning a value series uses along the category axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LinePlacement {
    /// Center of each category section.
    SectionCenter,
    /// Center of a series' item inside a grouped section.
    Slot {
        layout: SlotLayout,
        series_index: usize,
    },
}

impl LinePlacement {
    #[must_use]
    pub fn x(self, divide_points: &[i32], index: usize) -> Option<f64> {
        let start = *divide_points.get(index)?;
        match self {
            Self::SectionCenter => {
                let end = *divide_points.get(index + 1)?;
                Some(f64::from(start + end) / 2.0)
            }
            Self::Slot {
                layout,
                series_index,
            } => Some(layout.center(start, series_index)),
        }
    }
}

/// Maps `values` to points in series-region pixels.
///
/// Gaps are never bridged: each absent sample closes the current run. Values
/// past the last division are ignored.
#[must_use]
pub fn project_line_runs(
    values: &[f64],
    divide_points: &[i32],
    placement: LinePlacement,
    axis: &AxisRange,
) -> Vec<LineRun> {
    project_optional_runs(
        values.iter().map(|value| nullable(*value)),
        divide_points,
        placement,
        axis,
    )
}

/// Same as [`project_line_runs`] for already-fitted optional values.
#[must_use]
pub fn project_optional_runs<I>(
    values: I,
    divide_points: &[i32],
    placement: LinePlacement,
    axis: &AxisRange,
) -> Vec<LineRun>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut runs = Vec::new();
    let mut current = LineRun::new();
    for (index, value) in values.into_iter().enumerate() {
        let point = value.and_then(|value| {
            placement
                .x(divide_points, index)
                .map(|x| Point::new(x, axis.value_to_pixel_inverted(value)))
        });
        match point {
            Some(point) => current.push(point),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
