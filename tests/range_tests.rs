use chart_geometry::core::{
    AxisRange, MAX_LABEL_COUNT, NULL_VALUE, RangeRequest, RangeResult, auto_divide,
    compute_range, is_decimal_data, nice_step, stacked_extent, value_extent,
};
use proptest::prelude::*;

#[test]
fn integer_data_pads_to_round_interval() {
    let result = compute_range(&RangeRequest::new(0.0, 100.0));
    assert_eq!(result.min, 0.0);
    assert_eq!(result.max, 120.0);
    assert_eq!(result.label_count, 7);
    assert!((result.interval() - 20.0).abs() <= 1e-9);
}

#[test]
fn positive_data_never_pads_below_zero() {
    let result = compute_range(&RangeRequest::new(2.0, 90.0));
    assert!(result.min >= 0.0);
    assert!(result.max >= 90.0);
}

#[test]
fn overrides_are_used_verbatim() {
    let request = RangeRequest::new(3.0, 97.0).with_overrides(Some(0.0), Some(100.0));
    let result = compute_range(&request);
    assert_eq!(result.min, 0.0);
    assert_eq!(result.max, 100.0);
    assert_eq!(result.label_count, 6);
}

#[test]
fn zero_padding_keeps_raw_bounds() {
    let request = RangeRequest::new(-3.0, 17.0).with_padding_scale(0.0, 0.0);
    let result = compute_range(&request);
    assert_eq!(result.min, -3.0);
    assert_eq!(result.max, 17.0);
}

#[test]
fn flat_data_is_widened() {
    let result = compute_range(&RangeRequest::new(5.0, 5.0));
    assert!(result.min < 5.0);
    assert!(result.max > 5.0);

    let zero = compute_range(&RangeRequest::new(0.0, 0.0));
    assert_eq!(zero.min, 0.0);
    assert!(zero.max >= 1.0);
}

#[test]
fn absent_bounds_fall_back_to_unit_range() {
    let result = compute_range(&RangeRequest::new(NULL_VALUE, NULL_VALUE));
    assert_eq!(result.min, 0.0);
    assert!(result.max >= 1.0);
}

#[test]
fn label_count_hint_is_respected() {
    let request = RangeRequest::new(0.0, 100.0).with_label_count_hint(Some(4));
    let result = compute_range(&request);
    assert_eq!(result.label_count, 4);
    assert!(result.max >= 100.0);
}

#[test]
fn decimal_detection_looks_at_bounds_and_span() {
    assert!(!is_decimal_data(0.0, 10.0));
    assert!(is_decimal_data(0.5, 10.0));
    assert!(is_decimal_data(0.0, 10.25));
    assert!(!is_decimal_data(f64::NAN, 1.0));
}

#[test]
fn auto_divide_puts_remainder_in_trailing_slots() {
    assert_eq!(auto_divide(10, 3), vec![0, 3, 6, 10]);
    assert_eq!(auto_divide(12, 5), vec![0, 2, 4, 6, 9, 12]);
    assert_eq!(auto_divide(100, 0), vec![0]);
    assert_eq!(auto_divide(-5, 2), vec![0, 0, 0]);
}

#[test]
fn value_axis_maps_both_directions() {
    let axis = AxisRange::value(
        RangeResult {
            min: 0.0,
            max: 100.0,
            label_count: 6,
        },
        200,
    );
    assert_eq!(axis.divide_points, vec![0, 40, 80, 120, 160, 200]);
    assert_eq!(axis.value_to_pixel(25.0), 50.0);
    assert_eq!(axis.value_to_pixel_inverted(25.0), 150.0);
    assert_eq!(axis.pixel_to_value(50.0), 25.0);
    assert_eq!(axis.tick_values(), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn category_axis_has_one_slot_per_category() {
    let axis = AxisRange::category(4, 100);
    assert!(axis.is_category);
    assert_eq!(axis.divide_count(), 4);
    assert_eq!(axis.divide_points, vec![0, 25, 50, 75, 100]);
}

#[test]
fn extents_skip_absent_values() {
    assert_eq!(value_extent([3.0, NULL_VALUE, -1.0, 8.0]), Some((-1.0, 8.0)));
    assert_eq!(value_extent([NULL_VALUE]), None);

    let up = [1.0, 2.0, -3.0];
    let down = [4.0, -1.0, -2.0];
    assert_eq!(stacked_extent(&[&up, &down]), Some((-5.0, 5.0)));
}

proptest! {
    #[test]
    fn padded_range_covers_data_on_nice_steps(
        min in -100_000.0f64..100_000.0,
        span in 0.01f64..1_000_000.0,
        scale_min in 0.1f64..3.0,
        scale_max in 0.1f64..3.0,
    ) {
        let max = min + span;
        let request = RangeRequest::new(min, max).with_padding_scale(scale_min, scale_max);
        let result = compute_range(&request);

        prop_assert!(result.min <= min);
        prop_assert!(result.max >= max);
        prop_assert!(result.min < result.max);
        prop_assert!((2..=MAX_LABEL_COUNT).contains(&result.label_count));
        if min >= 0.0 {
            prop_assert!(result.min >= 0.0);
        }

        // Shrink slightly so float noise rounds up to the step itself.
        let interval = result.interval();
        let nice = nice_step(interval * (1.0 - 1e-6));
        prop_assert!((nice - interval).abs() <= interval * 1e-6);
    }

    #[test]
    fn auto_divide_slots_differ_by_at_most_one_pixel(
        width in 0i32..10_000,
        count in 1usize..500,
    ) {
        let points = auto_divide(width, count);
        prop_assert_eq!(points.len(), count + 1);
        prop_assert_eq!(points[0], 0);
        prop_assert_eq!(*points.last().unwrap(), width);

        let widths: Vec<i32> = points.windows(2).map(|pair| pair[1] - pair[0]).collect();
        let narrow = *widths.iter().min().unwrap();
        let wide = *widths.iter().max().unwrap();
        prop_assert!(wide - narrow <= 1);
        // Wider slots only ever trail narrower ones.
        prop_assert!(widths.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
