use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{AxisRange, OhlcSample, SlotLayout};
use crate::error::{ChartError, ChartResult};
use crate::extensions::patterns::PatternScanResult;
use crate::render::TextMeasurer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationSide {
    Above,
    Below,
}

/// Label pinned to a pixel anchor inside the series region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub x: f64,
    pub anchor_y: f64,
    pub side: AnnotationSide,
    pub text: String,
    pub priority: i32,
}

impl Annotation {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        x: f64,
        anchor_y: f64,
        side: AnnotationSide,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            x,
            anchor_y,
            side,
            text: text.into(),
            priority: 0,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPlacementConfig {
    pub marker_size_px: f64,
    pub font_size_px: f64,
    pub label_horizontal_padding_px: f64,
    pub marker_label_gap_px: f64,
    pub lane_gap_px: f64,
    pub min_horizontal_gap_px: f64,
    pub vertical_offset_px: f64,
}

impl Default for AnnotationPlacementConfig {
    fn default() -> Self {
        Self {
            marker_size_px: 6.0,
            font_size_px: 10.0,
            label_horizontal_padding_px: 3.0,
            marker_label_gap_px: 2.0,
            lane_gap_px: 2.0,
            min_horizontal_gap_px: 2.0,
            vertical_offset_px: 4.0,
        }
    }
}

impl AnnotationPlacementConfig {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.marker_size_px, "marker_size_px"),
            (self.font_size_px, "font_size_px"),
            (
                self.label_horizontal_padding_px,
                "label_horizontal_padding_px",
            ),
            (self.marker_label_gap_px, "marker_label_gap_px"),
            (self.lane_gap_px, "lane_gap_px"),
            (self.min_horizontal_gap_px, "min_horizontal_gap_px"),
            (self.vertical_offset_px, "vertical_offset_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "annotation config `{name}` must be finite and >= 0"
                )));
            }
        }
        if self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "annotation font size must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBox {
    pub left_px: f64,
    pub top_px: f64,
    pub width_px: f64,
    pub height_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAnnotation {
    pub id: String,
    pub text: String,
    pub side: AnnotationSide,
    pub lane: usize,
    /// Marker center.
    pub x: f64,
    pub y: f64,
    pub label: LabelBox,
}

/// Stacks annotations into lanes so labels on the same side never overlap.
///
/// Placement order is stable by x, priority (desc), then id. `region_width`
/// keeps labels horizontally inside the series region.
pub fn place_annotations(
    annotations: &[Annotation],
    region_width: f64,
    measurer: &dyn TextMeasurer,
    config: AnnotationPlacementConfig,
) -> ChartResult<Vec<PlacedAnnotation>> {
    let config = config.validate()?;
    let mut prepared = Vec::with_capacity(annotations.len());
    for (index, annotation) in annotations.iter().enumerate() {
        if !annotation.x.is_finite() || !annotation.anchor_y.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "annotation `{}` anchor must be finite",
                annotation.id
            )));
        }
        let extent = measurer.measure(&annotation.text, config.font_size_px);
        let width = extent.width + 2.0 * config.label_horizontal_padding_px;
        let half = 0.5 * width.max(config.marker_size_px);
        let x = clamp_x(annotation.x, half, region_width);
        prepared.push(Prepared {
            index,
            annotation,
            x,
            left: x - half,
            right: x + half,
            label_width: width,
            label_height: extent.height,
        });
    }

    prepared.sort_by(|a, b| {
        OrderedFloat(a.x)
            .cmp(&OrderedFloat(b.x))
            .then_with(|| b.annotation.priority.cmp(&a.annotation.priority))
            .then_with(|| a.annotation.id.cmp(&b.annotation.id))
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut above_lanes = Vec::<f64>::new();
    let mut below_lanes = Vec::<f64>::new();
    let mut placed = Vec::with_capacity(prepared.len());

    for item in prepared {
        let lanes = match item.annotation.side {
            AnnotationSide::Above => &mut above_lanes,
            AnnotationSide::Below => &mut below_lanes,
        };
        let lane = allocate_lane(lanes, item.left, item.right, config.min_horizontal_gap_px);
        let lane_step = config.marker_size_px
            + config.marker_label_gap_px
            + item.label_height
            + config.lane_gap_px;
        let offset = config.vertical_offset_px + lane as f64 * lane_step;
        let (y, label_top) = match item.annotation.side {
            AnnotationSide::Above => {
                let y = item.annotation.anchor_y - offset;
                let top = y
                    - 0.5 * config.marker_size_px
                    - config.marker_label_gap_px
                    - item.label_height;
                (y, top)
            }
            AnnotationSide::Below => {
                let y = item.annotation.anchor_y + offset;
                (y, y + 0.5 * config.marker_size_px + config.marker_label_gap_px)
            }
        };

        placed.push(PlacedAnnotation {
            id: item.annotation.id.clone(),
            text: item.annotation.text.clone(),
            side: item.annotation.side,
            lane,
            x: item.x,
            y,
            label: LabelBox {
                left_px: item.x - 0.5 * item.label_width,
                top_px: label_top,
                width_px: item.label_width,
                height_px: item.label_height,
            },
        });
    }

    Ok(placed)
}

/// Annotations for every detection in `scan`, anchored at the candle's
/// slot center.
///
/// Bullish formations sit under the low, the rest above the high.
/// `axis` maps prices onto the series region height.
#[must_use]
pub fn pattern_annotations(
    scan: &PatternScanResult,
    samples: &[OhlcSample],
    divide_points: &[i32],
    slot: SlotLayout,
    series_index: usize,
    axis: &AxisRange,
) -> Vec<Annotation> {
    let mut annotations = Vec::with_capacity(scan.total());
    for (index, detections) in scan.iter() {
        let (Some(sample), Some(start)) = (samples.get(index), divide_points.get(index)) else {
            continue;
        };
        let x = slot.center(*start, series_index);
        for detection in detections {
            let (side, anchor) = if detection.pattern.is_bullish() {
                (AnnotationSide::Below, sample.low)
            } else {
                (AnnotationSide::Above, sample.high)
            };
            let priority = i32::try_from(detection.pattern.candle_count()).unwrap_or(0);
            annotations.push(
                Annotation::new(
                    format!("{series_index}:{index}:{:?}", detection.pattern),
                    x,
                    axis.value_to_pixel_inverted(anchor),
                    side,
                    detection.label.clone(),
                )
                .with_priority(priority),
            );
        }
    }
    annotations
}

#[derive(Debug)]
struct Prepared<'a> {
    index: usize,
    annotation: &'a Annotation,
    x: f64,
    left: f64,
    right: f64,
    label_width: f64,
    label_height: f64,
}

fn clamp_x(x: f64, half: f64, region_width: f64) -> f64 {
    if region_width <= 2.0 * half {
        region_width * 0.5
    } else {
        x.clamp(half, region_width - half)
    }
}

fn allocate_lane(last_right: &mut Vec<f64>, left: f64, right: f64, min_gap: f64) -> usize {
    for (lane, lane_last_right) in last_right.iter_mut().enumerate() {
        if left >= *lane_last_right + min_gap {
            *lane_last_right = right;
            return lane;
        }
    }
    last_right.push(right);
    last_right.len() - 1
}

#[cfg(test)]
mod tests {
    use super::{allocate_lane, clamp_x};

    #[test]
    fn lanes_are_reused_once_free() {
        let mut lanes = Vec::new();
        assert_eq!(allocate_lane(&mut lanes, 0.0, 10.0, 2.0), 0);
        assert_eq!(allocate_lane(&mut lanes, 5.0, 15.0, 2.0), 1);
        assert_eq!(allocate_lane(&mut lanes, 12.0, 20.0, 2.0), 0);
    }

    #[test]
    fn labels_wider_than_region_are_centered() {
        assert_eq!(clamp_x(3.0, 20.0, 30.0), 15.0);
        assert_eq!(clamp_x(-5.0, 5.0, 100.0), 5.0);
    }
}
