use chart_geometry::core::OhlcSample;
use chart_geometry::extensions::patterns::{
    is_bearish_engulfing, is_bearish_harami, is_bearish_marubozu, is_bullish_engulfing,
    is_bullish_harami, is_bullish_marubozu, is_dark_cloud_cover, is_doji, is_dragonfly_doji,
    is_evening_star, is_gravestone_doji, is_hammer, is_hanging_man, is_inverted_hammer,
    is_morning_star, is_piercing_line, is_shooting_star, is_spinning_top, is_three_black_crows,
    is_three_white_soldiers, is_tweezer_bottom, is_tweezer_top,
};
use chart_geometry::extensions::{
    PatternConfig, PatternKind, PatternScanConfig, scan_patterns,
};
use proptest::prelude::*;

fn loose_doji() -> PatternConfig {
    PatternConfig {
        doji_threshold: 0.01,
        ..PatternConfig::default()
    }
}

#[test]
fn doji_body_threshold() {
    let config = loose_doji();
    let doji = [OhlcSample::new(100.0, 105.0, 95.0, 100.05)];
    let plain = [OhlcSample::new(100.0, 105.0, 95.0, 103.0)];
    assert!(is_doji(&doji, 0, &config));
    assert!(!is_doji(&plain, 0, &config));
}

#[test]
fn bullish_engulfing_scenario() {
    let samples = [
        OhlcSample::new(102.0, 103.0, 101.0, 101.5),
        OhlcSample::new(100.0, 105.0, 99.0, 104.0),
    ];
    let config = PatternConfig {
        engulfing_min_size: 0.8,
        ..PatternConfig::default()
    };
    assert!(is_bullish_engulfing(&samples, 1, &config));
    assert!(!is_bearish_engulfing(&samples, 1, &config));
}

#[test]
fn engulfing_requires_the_whole_previous_body() {
    let config = PatternConfig::default();
    // Opens inside the previous body, so only part of it is covered.
    let partial = [
        OhlcSample::new(102.0, 102.5, 100.5, 101.0),
        OhlcSample::new(101.1, 103.5, 101.0, 103.0),
    ];
    assert!(!is_bullish_engulfing(&partial, 1, &config));

    let exact = [
        OhlcSample::new(102.0, 102.5, 100.5, 101.0),
        OhlcSample::new(101.0, 102.5, 100.5, 102.0),
    ];
    assert!(is_bullish_engulfing(&exact, 1, &config));
}

#[test]
fn bearish_engulfing_scenario() {
    let config = PatternConfig::default();
    let samples = [
        OhlcSample::new(101.0, 102.5, 100.5, 102.0),
        OhlcSample::new(102.5, 103.0, 100.0, 100.5),
    ];
    assert!(is_bearish_engulfing(&samples, 1, &config));
    assert!(!is_bullish_engulfing(&samples, 1, &config));

    let partial = [
        OhlcSample::new(101.0, 102.5, 100.5, 102.0),
        OhlcSample::new(101.9, 102.0, 100.0, 100.5),
    ];
    assert!(!is_bearish_engulfing(&partial, 1, &config));
}

#[test]
fn multi_candle_patterns_need_history() {
    let config = PatternConfig::default();
    let samples = [OhlcSample::new(100.0, 105.0, 99.0, 104.0)];
    assert!(!is_bullish_engulfing(&samples, 0, &config));
    assert!(!is_morning_star(&samples, 0, &config));
    assert!(!is_three_white_soldiers(&samples, 0, &config));
}

#[test]
fn invalid_history_blocks_detection() {
    let config = PatternConfig::default();
    let samples = [
        OhlcSample::null(),
        OhlcSample::new(100.0, 105.0, 99.0, 104.0),
    ];
    assert!(!is_bullish_engulfing(&samples, 1, &config));
}

#[test]
fn hammer_has_long_lower_shadow() {
    let config = PatternConfig::default();
    let hammer = [OhlcSample::new(100.0, 101.1, 94.0, 101.0)];
    assert!(is_hammer(&hammer, 0, &config));
    let inverted = [OhlcSample::new(100.0, 107.0, 99.9, 101.0)];
    assert!(!is_hammer(&inverted, 0, &config));
}

#[test]
fn three_white_soldiers_climb() {
    let config = PatternConfig::default();
    let samples = [
        OhlcSample::new(100.0, 104.2, 99.9, 104.0),
        OhlcSample::new(102.0, 106.2, 101.9, 106.0),
        OhlcSample::new(104.0, 108.2, 103.9, 108.0),
    ];
    assert!(is_three_white_soldiers(&samples, 2, &config));
    assert!(!is_three_white_soldiers(&samples, 1, &config));
}

#[test]
fn dragonfly_and_gravestone_doji_mirror_each_other() {
    let config = PatternConfig::default();
    let dragonfly = [OhlcSample::new(100.0, 100.05, 95.0, 100.0)];
    let gravestone = [OhlcSample::new(100.0, 105.0, 99.95, 100.0)];
    assert!(is_dragonfly_doji(&dragonfly, 0, &config));
    assert!(!is_gravestone_doji(&dragonfly, 0, &config));
    assert!(is_gravestone_doji(&gravestone, 0, &config));
    assert!(!is_dragonfly_doji(&gravestone, 0, &config));
}

#[test]
fn shooting_star_needs_a_prior_advance() {
    let config = PatternConfig::default();
    let star = OhlcSample::new(104.5, 108.0, 104.4, 105.0);
    let rising = [OhlcSample::new(100.0, 104.2, 99.8, 104.0), star];
    let falling = [OhlcSample::new(104.0, 104.2, 99.8, 100.0), star];
    assert!(is_inverted_hammer(&rising, 1, &config));
    assert!(is_shooting_star(&rising, 1, &config));
    assert!(!is_shooting_star(&falling, 1, &config));
}

#[test]
fn hanging_man_needs_a_prior_advance() {
    let config = PatternConfig::default();
    let hanging = OhlcSample::new(105.0, 105.1, 101.5, 104.5);
    let rising = [OhlcSample::new(100.0, 104.2, 99.8, 104.0), hanging];
    let falling = [OhlcSample::new(104.0, 104.2, 99.8, 100.0), hanging];
    assert!(is_hammer(&rising, 1, &config));
    assert!(is_hanging_man(&rising, 1, &config));
    assert!(!is_hanging_man(&falling, 1, &config));
}

#[test]
fn spinning_top_has_shadows_on_both_sides() {
    let config = PatternConfig::default();
    let top = [OhlcSample::new(100.0, 102.0, 98.0, 100.8)];
    let clipped = [OhlcSample::new(100.0, 100.9, 98.0, 100.8)];
    assert!(is_spinning_top(&top, 0, &config));
    assert!(!is_spinning_top(&clipped, 0, &config));
}

#[test]
fn marubozu_has_no_meaningful_shadows() {
    let config = PatternConfig::default();
    let bullish = [OhlcSample::new(100.0, 104.1, 99.9, 104.0)];
    let bearish = [OhlcSample::new(104.0, 104.1, 99.9, 100.0)];
    let wicked = [OhlcSample::new(100.0, 106.0, 99.9, 104.0)];
    assert!(is_bullish_marubozu(&bullish, 0, &config));
    assert!(!is_bearish_marubozu(&bullish, 0, &config));
    assert!(is_bearish_marubozu(&bearish, 0, &config));
    assert!(!is_bullish_marubozu(&bearish, 0, &config));
    assert!(!is_bullish_marubozu(&wicked, 0, &config));
}

#[test]
fn harami_body_sits_inside_the_previous_body() {
    let config = PatternConfig::default();
    let bullish = [
        OhlcSample::new(105.0, 105.2, 99.8, 100.0),
        OhlcSample::new(101.0, 103.0, 100.5, 102.5),
    ];
    assert!(is_bullish_harami(&bullish, 1, &config));
    assert!(!is_bearish_harami(&bullish, 1, &config));

    let escapes = [
        OhlcSample::new(105.0, 105.2, 99.8, 100.0),
        OhlcSample::new(101.0, 106.0, 100.5, 105.5),
    ];
    assert!(!is_bullish_harami(&escapes, 1, &config));

    let bearish = [
        OhlcSample::new(100.0, 105.2, 99.8, 105.0),
        OhlcSample::new(103.0, 103.5, 101.0, 101.5),
    ];
    assert!(is_bearish_harami(&bearish, 1, &config));

    // Mother candle body is too short relative to its range.
    let short_mother = [
        OhlcSample::new(100.0, 110.0, 95.0, 105.0),
        OhlcSample::new(103.0, 103.5, 101.0, 101.5),
    ];
    assert!(!is_bearish_harami(&short_mother, 1, &config));
}

#[test]
fn piercing_line_closes_past_the_midpoint() {
    let config = PatternConfig::default();
    let piercing = [
        OhlcSample::new(110.0, 110.5, 99.5, 100.0),
        OhlcSample::new(99.0, 107.0, 98.5, 106.0),
    ];
    let shallow = [
        OhlcSample::new(110.0, 110.5, 99.5, 100.0),
        OhlcSample::new(99.0, 107.0, 98.5, 104.0),
    ];
    assert!(is_piercing_line(&piercing, 1, &config));
    assert!(!is_piercing_line(&shallow, 1, &config));
}

#[test]
fn dark_cloud_cover_closes_below_the_midpoint() {
    let config = PatternConfig::default();
    let cover = [
        OhlcSample::new(100.0, 110.5, 99.5, 110.0),
        OhlcSample::new(111.0, 111.5, 103.0, 104.0),
    ];
    let shallow = [
        OhlcSample::new(100.0, 110.5, 99.5, 110.0),
        OhlcSample::new(111.0, 111.5, 105.0, 106.0),
    ];
    assert!(is_dark_cloud_cover(&cover, 1, &config));
    assert!(!is_dark_cloud_cover(&shallow, 1, &config));
}

#[test]
fn tweezers_match_extremes_within_tolerance() {
    let config = PatternConfig::default();
    let top = [
        OhlcSample::new(100.0, 105.0, 99.5, 104.5),
        OhlcSample::new(104.5, 105.05, 101.0, 101.5),
    ];
    let uneven_top = [
        OhlcSample::new(100.0, 105.0, 99.5, 104.5),
        OhlcSample::new(104.5, 106.0, 101.0, 101.5),
    ];
    assert!(is_tweezer_top(&top, 1, &config));
    assert!(!is_tweezer_top(&uneven_top, 1, &config));

    let bottom = [
        OhlcSample::new(105.0, 105.5, 100.0, 100.5),
        OhlcSample::new(100.5, 104.0, 100.05, 103.5),
    ];
    let uneven_bottom = [
        OhlcSample::new(105.0, 105.5, 100.0, 100.5),
        OhlcSample::new(100.5, 104.0, 99.0, 103.5),
    ];
    assert!(is_tweezer_bottom(&bottom, 1, &config));
    assert!(!is_tweezer_bottom(&uneven_bottom, 1, &config));
}

#[test]
fn stars_reverse_through_the_first_midpoint() {
    let config = PatternConfig::default();
    let morning = [
        OhlcSample::new(110.0, 110.5, 99.5, 100.0),
        OhlcSample::new(99.0, 99.5, 98.0, 98.7),
        OhlcSample::new(99.0, 107.5, 98.8, 107.0),
    ];
    assert!(is_morning_star(&morning, 2, &config));
    assert!(!is_evening_star(&morning, 2, &config));

    let evening = [
        OhlcSample::new(100.0, 110.5, 99.5, 110.0),
        OhlcSample::new(111.0, 112.0, 110.5, 111.3),
        OhlcSample::new(110.0, 110.5, 102.5, 103.0),
    ];
    let weak_evening = [
        OhlcSample::new(100.0, 110.5, 99.5, 110.0),
        OhlcSample::new(111.0, 112.0, 110.5, 111.3),
        OhlcSample::new(110.0, 110.5, 105.5, 106.0),
    ];
    assert!(is_evening_star(&evening, 2, &config));
    assert!(!is_evening_star(&weak_evening, 2, &config));
}

#[test]
fn three_black_crows_open_inside_the_prior_body() {
    let config = PatternConfig::default();
    let crows = [
        OhlcSample::new(110.0, 110.2, 104.8, 105.0),
        OhlcSample::new(106.0, 106.2, 100.8, 101.0),
        OhlcSample::new(102.0, 102.2, 96.8, 97.0),
    ];
    let gapped = [
        OhlcSample::new(110.0, 110.2, 104.8, 105.0),
        OhlcSample::new(106.0, 106.2, 100.8, 101.0),
        OhlcSample::new(100.5, 100.6, 96.8, 97.0),
    ];
    assert!(is_three_black_crows(&crows, 2, &config));
    assert!(!is_three_black_crows(&gapped, 2, &config));
    assert!(!is_three_white_soldiers(&crows, 2, &config));
}

#[test]
fn scan_collects_overlapping_detections() {
    let samples = [
        OhlcSample::new(102.0, 103.0, 101.0, 101.5),
        OhlcSample::new(100.0, 105.0, 99.0, 104.0),
        OhlcSample::new(100.0, 105.0, 95.0, 100.0),
    ];
    let result = scan_patterns(&samples, &PatternScanConfig::default());

    assert!(result.contains(1, PatternKind::BullishEngulfing));
    assert!(result.contains(2, PatternKind::Doji));
    assert!(result.contains(2, PatternKind::LongLeggedDoji));
    assert!(result.at(2).len() >= 2);
    assert!(result.at(0).iter().all(|found| found.pattern.candle_count() == 1));
    assert!(result.total() >= result.len());
}

#[test]
fn scan_honors_enabled_subset() {
    let samples = [
        OhlcSample::new(102.0, 103.0, 101.0, 101.5),
        OhlcSample::new(100.0, 105.0, 99.0, 104.0),
        OhlcSample::new(100.0, 105.0, 95.0, 100.0),
    ];
    let config = PatternScanConfig::only([PatternKind::Doji]);
    let result = scan_patterns(&samples, &config);
    assert_eq!(result.len(), 1);
    assert_eq!(result.at(2)[0].pattern, PatternKind::Doji);
    assert_eq!(result.at(2)[0].label, PatternKind::Doji.label());
    assert!(result.at(1).is_empty());
}

#[test]
fn scan_config_round_trips_json() {
    let config = PatternScanConfig::only([PatternKind::Hammer, PatternKind::MorningStar])
        .with_thresholds(loose_doji());
    let json = serde_json::to_string(&config).expect("serialize");
    assert!(json.contains("morning_star"));
    let parsed: PatternScanConfig = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed, config);
}

fn sample_strategy() -> impl Strategy<Value = OhlcSample> {
    (1.0f64..1_000.0, 0.0f64..50.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(low, span, open_factor, close_factor)| {
            let high = low + span;
            OhlcSample::new(
                (low + open_factor * span).min(high),
                high,
                low,
                (low + close_factor * span).min(high),
            )
        },
    )
}

proptest! {
    #[test]
    fn scanning_is_pure_and_never_looks_ahead(
        samples in proptest::collection::vec(sample_strategy(), 1..40),
        cut in 0usize..40,
    ) {
        let config = PatternScanConfig::default();
        let snapshot = samples.clone();
        let first = scan_patterns(&samples, &config);
        let second = scan_patterns(&samples, &config);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&samples, &snapshot);

        // Truncating the tail must not change detections before the cut.
        let cut = cut.min(samples.len());
        let prefix = scan_patterns(&samples[..cut], &config);
        for index in 0..cut {
            prop_assert_eq!(prefix.at(index), first.at(index));
        }
    }
}
