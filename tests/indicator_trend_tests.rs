use approx::assert_relative_eq;
use chart_geometry::ChartError;
use chart_geometry::core::NULL_VALUE;
use chart_geometry::extensions::{
    TrendLineKind, calculate_bollinger, calculate_ema, calculate_rsi, calculate_sma,
    cubic_regression, default_window, fit_trend, fit_trends, linear_regression,
    moving_average_trend, solve_linear_system,
};

fn one_to_ten() -> Vec<f64> {
    (1..=10).map(f64::from).collect()
}

#[test]
fn sma_window_three_over_one_to_ten() {
    let sma = calculate_sma(&one_to_ten(), 3);
    assert_eq!(sma.len(), 10);
    assert_eq!(sma[0], None);
    assert_eq!(sma[1], None);
    assert_relative_eq!(sma[2].expect("first full window"), 2.0);
    assert_relative_eq!(sma[9].expect("last window"), 9.0);
}

#[test]
fn sma_window_with_gap_is_absent() {
    let sma = calculate_sma(&[1.0, NULL_VALUE, 3.0, 4.0, 5.0], 2);
    assert_eq!(sma[1], None);
    assert_eq!(sma[2], None);
    assert_eq!(sma[3], Some(3.5));
}

#[test]
fn ema_seeds_from_sma_then_smooths() {
    let ema = calculate_ema(&one_to_ten(), 3);
    assert_eq!(ema[1], None);
    assert_relative_eq!(ema[2].expect("seed"), 2.0);
    // k = 0.5 for window 3.
    assert_relative_eq!(ema[3].expect("smoothed"), 3.0);
}

#[test]
fn bollinger_bands_bracket_the_mean() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let bands = calculate_bollinger(&values, 8, 2.0);
    assert_relative_eq!(bands.middle[7].expect("mean"), 5.0);
    assert_relative_eq!(bands.upper[7].expect("upper"), 9.0);
    assert_relative_eq!(bands.lower[7].expect("lower"), 1.0);
    assert_eq!(bands.middle[6], None);
}

#[test]
fn rsi_of_monotonic_rise_is_one_hundred() {
    let rsi = calculate_rsi(&one_to_ten(), 3);
    assert_eq!(rsi[2], None);
    assert_relative_eq!(rsi[3].expect("first value"), 100.0);
    assert_relative_eq!(rsi[9].expect("last value"), 100.0);
}

#[test]
fn rsi_uses_wilder_smoothing_on_mixed_moves() {
    // Changes: +2, -1, +2, -1, +2.
    let values = [44.0, 46.0, 45.0, 47.0, 46.0, 48.0];
    let rsi = calculate_rsi(&values, 3);
    assert_eq!(rsi[2], None);

    // Seed: average gain 4/3, average loss 1/3.
    assert_relative_eq!(rsi[3].expect("seeded"), 80.0, epsilon = 1e-9);

    // Gain (4/3 * 2 + 0) / 3 = 8/9, loss (1/3 * 2 + 1) / 3 = 5/9.
    let rs = (8.0 / 9.0) / (5.0 / 9.0);
    assert_relative_eq!(rsi[4].expect("smoothed"), 100.0 - 100.0 / (1.0 + rs), epsilon = 1e-9);
    assert_relative_eq!(rsi[4].expect("smoothed"), 61.538_461_538, epsilon = 1e-6);

    // Gain (8/9 * 2 + 2) / 3 = 34/27, loss (5/9 * 2 + 0) / 3 = 10/27.
    assert_relative_eq!(rsi[5].expect("smoothed"), 100.0 - 100.0 / 4.4, epsilon = 1e-9);
}

#[test]
fn linear_regression_recovers_exact_line() {
    let values: Vec<f64> = (0..6).map(|x| 2.0 * f64::from(x) + 1.0).collect();
    let fitted = linear_regression(&values).expect("fit");
    for (index, value) in fitted.iter().enumerate() {
        assert_relative_eq!(value.expect("fitted"), values[index], epsilon = 1e-9);
    }
}

#[test]
fn linear_regression_fills_gaps() {
    let fitted = linear_regression(&[1.0, NULL_VALUE, 3.0]).expect("fit");
    assert_relative_eq!(fitted[1].expect("interpolated"), 2.0, epsilon = 1e-9);
}

#[test]
fn linear_regression_needs_two_points() {
    let err = linear_regression(&[4.0]).expect_err("single point");
    assert!(matches!(
        err,
        ChartError::InsufficientData {
            required: 2,
            actual: 1
        }
    ));
}

#[test]
fn cubic_regression_recovers_cubic() {
    let values: Vec<f64> = (0..8)
        .map(|x| {
            let x = f64::from(x);
            x * x * x - 2.0 * x + 5.0
        })
        .collect();
    let fitted = cubic_regression(&values).expect("fit");
    for (index, value) in fitted.iter().enumerate() {
        assert_relative_eq!(value.expect("fitted"), values[index], epsilon = 1e-6);
    }
}

#[test]
fn cubic_falls_back_to_linear_on_short_input() {
    let values = [1.0, 2.0, 3.0];
    assert_eq!(
        cubic_regression(&values).expect("fallback"),
        linear_regression(&values).expect("linear")
    );
}

#[test]
fn moving_average_trend_matches_sma() {
    let values = one_to_ten();
    assert_eq!(
        moving_average_trend(&values, Some(3)).expect("trend"),
        calculate_sma(&values, 3)
    );
    assert_eq!(
        moving_average_trend(&values, None).expect("trend"),
        calculate_sma(&values, default_window(values.len()))
    );
}

#[test]
fn short_moving_average_falls_back_to_linear() {
    let values = [1.0, 3.0, 5.0];
    let fitted = moving_average_trend(&values, Some(2)).expect("fallback");
    assert!(fitted.iter().all(Option::is_some));
}

#[test]
fn fit_trend_dispatches_every_kind() {
    let values = one_to_ten();
    for kind in [
        TrendLineKind::Linear,
        TrendLineKind::Cubic,
        TrendLineKind::MovingAverage { window: None },
        TrendLineKind::ExponentialMovingAverage { window: Some(4) },
        TrendLineKind::BollingerUpper { window: None },
        TrendLineKind::BollingerLower { window: None },
        TrendLineKind::Rsi { window: Some(3) },
    ] {
        let fitted = fit_trend(&values, kind).expect("fit");
        assert_eq!(fitted.len(), values.len(), "{}", kind.label());
    }
}

#[test]
fn batch_fit_keeps_request_order() {
    let rising = one_to_ten();
    let lonely = [7.0];
    let results = fit_trends(&[
        (rising.as_slice(), TrendLineKind::Linear),
        (lonely.as_slice(), TrendLineKind::Linear),
        (rising.as_slice(), TrendLineKind::MovingAverage { window: Some(3) }),
    ]);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(
        results[2].as_ref().expect("sma"),
        &calculate_sma(&rising, 3)
    );
}

#[test]
fn singular_system_has_no_solution() {
    let matrix = [[1.0, 2.0], [2.0, 4.0]];
    assert_eq!(solve_linear_system(matrix, [1.0, 2.0]), None);

    let solved = solve_linear_system([[2.0, 1.0], [1.0, 3.0]], [3.0, 5.0]).expect("regular");
    assert_relative_eq!(solved[0], 0.8, epsilon = 1e-12);
    assert_relative_eq!(solved[1], 1.4, epsilon = 1e-12);
}

#[test]
fn trend_kind_serializes_with_tag() {
    let json = serde_json::to_string(&TrendLineKind::MovingAverage { window: Some(5) })
        .expect("serialize");
    assert_eq!(json, r#"{"type":"moving_average","window":5}"#);
    let parsed: TrendLineKind = serde_json::from_str(r#"{"type":"linear"}"#).expect("parse");
    assert_eq!(parsed, TrendLineKind::Linear);
}
