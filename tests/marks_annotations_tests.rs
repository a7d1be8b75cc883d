use chart_geometry::core::{AxisRange, NULL_VALUE, OhlcSample, RangeResult, auto_divide, compute_slot};
use chart_geometry::extensions::{
    Annotation, AnnotationPlacementConfig, AnnotationSide, MarkKind, MarkPoint, PatternKind,
    PatternScanConfig, mark_point, mark_value, ohlc_mark_values, pattern_annotations,
    place_annotations, scan_patterns,
};
use chart_geometry::render::MonospaceMeasurer;

#[test]
fn min_max_ties_resolve_to_earliest_index() {
    let values = [3.0, 1.0, 5.0, 1.0, 5.0];
    assert_eq!(
        mark_point(&values, MarkKind::Min),
        Some(MarkPoint {
            index: 1,
            value: 1.0
        })
    );
    assert_eq!(
        mark_point(&values, MarkKind::Max),
        Some(MarkPoint {
            index: 2,
            value: 5.0
        })
    );
}

#[test]
fn average_skips_absent_values() {
    let values = [2.0, NULL_VALUE, 4.0, 9.0];
    assert_eq!(mark_value(&values, MarkKind::Average), Some(5.0));
    assert_eq!(
        mark_point(&values, MarkKind::Average).map(|point| point.index),
        Some(2)
    );
    assert_eq!(mark_value(&[NULL_VALUE], MarkKind::Max), None);
}

#[test]
fn candle_marks_read_the_matching_field() {
    let samples = [
        OhlcSample::new(10.0, 12.0, 9.0, 11.0),
        OhlcSample::null(),
        OhlcSample::new(11.0, 15.0, 8.0, 14.0),
    ];
    assert_eq!(ohlc_mark_values(&samples, MarkKind::Min), vec![9.0, NULL_VALUE, 8.0]);
    assert_eq!(ohlc_mark_values(&samples, MarkKind::Max), vec![12.0, NULL_VALUE, 15.0]);
    assert_eq!(
        mark_value(&ohlc_mark_values(&samples, MarkKind::Average), MarkKind::Average),
        Some(12.5)
    );
}

#[test]
fn overlapping_annotations_stack_into_lanes() {
    let annotations = [
        Annotation::new("a", 50.0, 100.0, AnnotationSide::Above, "doji"),
        Annotation::new("b", 52.0, 100.0, AnnotationSide::Above, "hammer"),
        Annotation::new("c", 300.0, 100.0, AnnotationSide::Above, "star"),
    ];
    let placed = place_annotations(
        &annotations,
        400.0,
        &MonospaceMeasurer::default(),
        AnnotationPlacementConfig::default(),
    )
    .expect("placement");

    let lane_of = |id: &str| {
        placed
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.lane)
            .expect("placed")
    };
    assert_eq!(lane_of("a"), 0);
    assert_eq!(lane_of("b"), 1);
    assert_eq!(lane_of("c"), 0);

    let a = placed.iter().find(|item| item.id == "a").expect("a");
    let b = placed.iter().find(|item| item.id == "b").expect("b");
    assert!(b.y < a.y, "higher lanes sit further above the anchor");
    assert!(a.label.top_px + a.label.height_px <= a.y);
}

#[test]
fn sides_use_independent_lanes() {
    let annotations = [
        Annotation::new("up", 50.0, 100.0, AnnotationSide::Above, "x"),
        Annotation::new("down", 50.0, 100.0, AnnotationSide::Below, "y"),
    ];
    let placed = place_annotations(
        &annotations,
        200.0,
        &MonospaceMeasurer::default(),
        AnnotationPlacementConfig::default(),
    )
    .expect("placement");
    assert!(placed.iter().all(|item| item.lane == 0));
    let below = placed.iter().find(|item| item.id == "down").expect("below");
    assert!(below.y > 100.0);
    assert!(below.label.top_px > below.y);
}

#[test]
fn labels_are_clamped_inside_region() {
    let annotations = [Annotation::new("edge", 1.0, 50.0, AnnotationSide::Above, "long label")];
    let placed = place_annotations(
        &annotations,
        300.0,
        &MonospaceMeasurer::default(),
        AnnotationPlacementConfig::default(),
    )
    .expect("placement");
    assert!(placed[0].label.left_px >= 0.0);
}

#[test]
fn placement_rejects_bad_input() {
    let measurer = MonospaceMeasurer::default();
    let bad_anchor = [Annotation::new("nan", f64::NAN, 0.0, AnnotationSide::Above, "x")];
    assert!(
        place_annotations(&bad_anchor, 100.0, &measurer, AnnotationPlacementConfig::default())
            .is_err()
    );

    let bad_config = AnnotationPlacementConfig {
        font_size_px: 0.0,
        ..AnnotationPlacementConfig::default()
    };
    assert!(place_annotations(&[], 100.0, &measurer, bad_config).is_err());
}

#[test]
fn pattern_annotations_align_with_candle_slots() {
    let samples = [
        OhlcSample::new(102.0, 103.0, 101.0, 101.5),
        OhlcSample::new(100.0, 105.0, 99.0, 104.0),
    ];
    let scan = scan_patterns(
        &samples,
        &PatternScanConfig::only([PatternKind::BullishEngulfing]),
    );
    let divide_points = auto_divide(100, 2);
    let slot = compute_slot(1, 50, Some(20), 0.1);
    let axis = AxisRange::value(
        RangeResult {
            min: 95.0,
            max: 105.0,
            label_count: 3,
        },
        100,
    );

    let annotations = pattern_annotations(&scan, &samples, &divide_points, slot, 0, &axis);
    assert_eq!(annotations.len(), 1);
    let annotation = &annotations[0];
    assert_eq!(annotation.x, slot.center(50, 0));
    assert_eq!(annotation.side, AnnotationSide::Below);
    assert_eq!(annotation.anchor_y, axis.value_to_pixel_inverted(99.0));
    assert_eq!(annotation.text, PatternKind::BullishEngulfing.label());
}
