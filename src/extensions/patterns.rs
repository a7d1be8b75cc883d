//! Candlestick formation detectors.
//!
//! Every detector is a pure predicate over the sample at `index` and at most
//! two samples before it. Detectors return `false` when history is missing
//! or when any inspected sample is invalid.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::OhlcSample;

/// Detector thresholds. Ratios are relative to the candle's high-low range
/// unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Max body/range for a doji.
    pub doji_threshold: f64,
    /// Min long-shadow/body for hammer-like shapes.
    pub shadow_ratio: f64,
    /// Max short-shadow/range for hammer-like shapes and marubozu.
    pub shadow_tolerance: f64,
    /// Min current-body/previous-body for engulfing formations.
    pub engulfing_min_size: f64,
    /// Min body/range for a "long" candle.
    pub long_body_ratio: f64,
    /// Max body/range for a "small" candle.
    pub small_body_ratio: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            doji_threshold: 0.001,
            shadow_ratio: 2.0,
            shadow_tolerance: 0.1,
            engulfing_min_size: 0.8,
            long_body_ratio: 0.6,
            small_body_ratio: 0.3,
        }
    }
}

/// Known formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Doji,
    LongLeggedDoji,
    DragonflyDoji,
    GravestoneDoji,
    Hammer,
    InvertedHammer,
    ShootingStar,
    HangingMan,
    SpinningTop,
    BullishMarubozu,
    BearishMarubozu,
    BullishEngulfing,
    BearishEngulfing,
    BullishHarami,
    BearishHarami,
    PiercingLine,
    DarkCloudCover,
    TweezerTop,
    TweezerBottom,
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

impl PatternKind {
    pub const ALL: [Self; 23] = [
        Self::Doji,
        Self::LongLeggedDoji,
        Self::DragonflyDoji,
        Self::GravestoneDoji,
        Self::Hammer,
        Self::InvertedHammer,
        Self::ShootingStar,
        Self::HangingMan,
        Self::SpinningTop,
        Self::BullishMarubozu,
        Self::BearishMarubozu,
        Self::BullishEngulfing,
        Self::BearishEngulfing,
        Self::BullishHarami,
        Self::BearishHarami,
        Self::PiercingLine,
        Self::DarkCloudCover,
        Self::TweezerTop,
        Self::TweezerBottom,
        Self::MorningStar,
        Self::EveningStar,
        Self::ThreeWhiteSoldiers,
        Self::ThreeBlackCrows,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Doji => "Doji",
            Self::LongLeggedDoji => "Long-Legged Doji",
            Self::DragonflyDoji => "Dragonfly Doji",
            Self::GravestoneDoji => "Gravestone Doji",
            Self::Hammer => "Hammer",
            Self::InvertedHammer => "Inverted Hammer",
            Self::ShootingStar => "Shooting Star",
            Self::HangingMan => "Hanging Man",
            Self::SpinningTop => "Spinning Top",
            Self::BullishMarubozu => "Bullish Marubozu",
            Self::BearishMarubozu => "Bearish Marubozu",
            Self::BullishEngulfing => "Bullish Engulfing",
            Self::BearishEngulfing => "Bearish Engulfing",
            Self::BullishHarami => "Bullish Harami",
            Self::BearishHarami => "Bearish Harami",
            Self::PiercingLine => "Piercing Line",
            Self::DarkCloudCover => "Dark Cloud Cover",
            Self::TweezerTop => "Tweezer Top",
            Self::TweezerBottom => "Tweezer Bottom",
            Self::MorningStar => "Morning Star",
            Self::EveningStar => "Evening Star",
            Self::ThreeWhiteSoldiers => "Three White Soldiers",
            Self::ThreeBlackCrows => "Three Black Crows",
        }
    }

    /// Number of consecutive candles the formation inspects.
    #[must_use]
    pub fn candle_count(self) -> usize {
        match self {
            Self::Doji
            | Self::LongLeggedDoji
            | Self::DragonflyDoji
            | Self::GravestoneDoji
            | Self::Hammer
            | Self::InvertedHammer
            | Self::SpinningTop
            | Self::BullishMarubozu
            | Self::BearishMarubozu => 1,
            Self::ShootingStar
            | Self::HangingMan
            | Self::BullishEngulfing
            | Self::BearishEngulfing
            | Self::BullishHarami
            | Self::BearishHarami
            | Self::PiercingLine
            | Self::DarkCloudCover
            | Self::TweezerTop
            | Self::TweezerBottom => 2,
            Self::MorningStar
            | Self::EveningStar
            | Self::ThreeWhiteSoldiers
            | Self::ThreeBlackCrows => 3,
        }
    }

    /// `true` for formations read as bullish reversals or continuations.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        matches!(
            self,
            Self::DragonflyDoji
                | Self::Hammer
                | Self::InvertedHammer
                | Self::BullishMarubozu
                | Self::BullishEngulfing
                | Self::BullishHarami
                | Self::PiercingLine
                | Self::TweezerBottom
                | Self::MorningStar
                | Self::ThreeWhiteSoldiers
        )
    }

    /// Runs this formation's detector at `index`.
    #[must_use]
    pub fn detect(self, samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
        let detector: fn(&[OhlcSample], usize, &PatternConfig) -> bool = match self {
            Self::Doji => is_doji,
            Self::LongLeggedDoji => is_long_legged_doji,
            Self::DragonflyDoji => is_dragonfly_doji,
            Self::GravestoneDoji => is_gravestone_doji,
            Self::Hammer => is_hammer,
            Self::InvertedHammer => is_inverted_hammer,
            Self::ShootingStar => is_shooting_star,
            Self::HangingMan => is_hanging_man,
            Self::SpinningTop => is_spinning_top,
            Self::BullishMarubozu => is_bullish_marubozu,
            Self::BearishMarubozu => is_bearish_marubozu,
            Self::BullishEngulfing => is_bullish_engulfing,
            Self::BearishEngulfing => is_bearish_engulfing,
            Self::BullishHarami => is_bullish_harami,
            Self::BearishHarami => is_bearish_harami,
            Self::PiercingLine => is_piercing_line,
            Self::DarkCloudCover => is_dark_cloud_cover,
            Self::TweezerTop => is_tweezer_top,
            Self::TweezerBottom => is_tweezer_bottom,
            Self::MorningStar => is_morning_star,
            Self::EveningStar => is_evening_star,
            Self::ThreeWhiteSoldiers => is_three_white_soldiers,
            Self::ThreeBlackCrows => is_three_black_crows,
        };
        detector(samples, index, config)
    }
}

/// Valid sample at `index - back`, if any.
fn sample_back(samples: &[OhlcSample], index: usize, back: usize) -> Option<OhlcSample> {
    let at = index.checked_sub(back)?;
    samples.get(at).copied().filter(|sample| sample.is_valid())
}

fn body_ratio(sample: OhlcSample) -> Option<f64> {
    let range = sample.range();
    (range > 0.0).then(|| sample.body() / range)
}

fn doji_shape(sample: OhlcSample, config: &PatternConfig) -> bool {
    body_ratio(sample).is_some_and(|ratio| ratio <= config.doji_threshold)
}

fn long_body(sample: OhlcSample, config: &PatternConfig) -> bool {
    body_ratio(sample).is_some_and(|ratio| ratio >= config.long_body_ratio)
}

fn small_body(sample: OhlcSample, config: &PatternConfig) -> bool {
    body_ratio(sample).is_some_and(|ratio| ratio <= config.small_body_ratio)
}

/// Long lower shadow, almost no upper shadow, real body present.
fn hammer_shape(sample: OhlcSample, config: &PatternConfig) -> bool {
    !doji_shape(sample, config)
        && sample.range() > 0.0
        && sample.lower_shadow() >= config.shadow_ratio * sample.body()
        && sample.upper_shadow() <= config.shadow_tolerance * sample.range()
}

/// Long upper shadow, almost no lower shadow, real body present.
fn inverted_hammer_shape(sample: OhlcSample, config: &PatternConfig) -> bool {
    !doji_shape(sample, config)
        && sample.range() > 0.0
        && sample.upper_shadow() >= config.shadow_ratio * sample.body()
        && sample.lower_shadow() <= config.shadow_tolerance * sample.range()
}

/// Previous candle rose into the current one.
fn after_advance(previous: OhlcSample, current: OhlcSample) -> bool {
    previous.is_bullish() && current.body_bottom() >= previous.midpoint()
}

/// Current body spans the previous body and is at least
/// `engulfing_min_size` times its size.
fn engulfs(previous: OhlcSample, current: OhlcSample, config: &PatternConfig) -> bool {
    current.body_bottom() <= previous.body_bottom()
        && current.body_top() >= previous.body_top()
        && current.body() >= config.engulfing_min_size * previous.body()
}

pub fn is_doji(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| doji_shape(current, config))
}

pub fn is_long_legged_doji(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| {
        doji_shape(current, config)
            && current.upper_shadow() >= current.range() * 0.3
            && current.lower_shadow() >= current.range() * 0.3
    })
}

pub fn is_dragonfly_doji(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| {
        doji_shape(current, config)
            && current.upper_shadow() <= config.shadow_tolerance * current.range()
    })
}

pub fn is_gravestone_doji(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| {
        doji_shape(current, config)
            && current.lower_shadow() <= config.shadow_tolerance * current.range()
    })
}

pub fn is_hammer(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| hammer_shape(current, config))
}

pub fn is_inverted_hammer(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| inverted_hammer_shape(current, config))
}

/// Inverted-hammer shape at the top of an advance.
pub fn is_shooting_star(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            inverted_hammer_shape(current, config) && after_advance(previous, current)
        }
        _ => false,
    }
}

/// Hammer shape at the top of an advance.
pub fn is_hanging_man(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            hammer_shape(current, config) && after_advance(previous, current)
        }
        _ => false,
    }
}

pub fn is_spinning_top(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0).is_some_and(|current| {
        !doji_shape(current, config)
            && small_body(current, config)
            && current.upper_shadow() >= current.body()
            && current.lower_shadow() >= current.body()
    })
}

fn marubozu_shape(sample: OhlcSample, config: &PatternConfig) -> bool {
    let range = sample.range();
    range > 0.0
        && long_body(sample, config)
        && sample.upper_shadow() <= config.shadow_tolerance * range
        && sample.lower_shadow() <= config.shadow_tolerance * range
}

pub fn is_bullish_marubozu(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0)
        .is_some_and(|current| current.is_bullish() && marubozu_shape(current, config))
}

pub fn is_bearish_marubozu(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    sample_back(samples, index, 0)
        .is_some_and(|current| current.is_bearish() && marubozu_shape(current, config))
}

pub fn is_bullish_engulfing(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bearish()
                && current.is_bullish()
                && engulfs(previous, current, config)
        }
        _ => false,
    }
}

pub fn is_bearish_engulfing(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bullish()
                && current.is_bearish()
                && engulfs(previous, current, config)
        }
        _ => false,
    }
}

fn harami(previous: OhlcSample, current: OhlcSample, config: &PatternConfig) -> bool {
    long_body(previous, config)
        && current.body() < previous.body()
        && current.body_top() <= previous.body_top()
        && current.body_bottom() >= previous.body_bottom()
}

pub fn is_bullish_harami(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bearish() && current.is_bullish() && harami(previous, current, config)
        }
        _ => false,
    }
}

pub fn is_bearish_harami(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bullish() && current.is_bearish() && harami(previous, current, config)
        }
        _ => false,
    }
}

pub fn is_piercing_line(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bearish()
                && long_body(previous, config)
                && current.is_bullish()
                && current.open < previous.close
                && current.close > previous.midpoint()
                && current.close < previous.open
        }
        _ => false,
    }
}

pub fn is_dark_cloud_cover(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bullish()
                && long_body(previous, config)
                && current.is_bearish()
                && current.open > previous.close
                && current.close < previous.midpoint()
                && current.close > previous.open
        }
        _ => false,
    }
}

fn tweezer_tolerance(previous: OhlcSample, current: OhlcSample, config: &PatternConfig) -> f64 {
    previous.range().max(current.range()) * config.shadow_tolerance * 0.5
}

pub fn is_tweezer_top(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bullish()
                && current.is_bearish()
                && (previous.high - current.high).abs()
                    <= tweezer_tolerance(previous, current, config)
        }
        _ => false,
    }
}

pub fn is_tweezer_bottom(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    match (sample_back(samples, index, 1), sample_back(samples, index, 0)) {
        (Some(previous), Some(current)) => {
            previous.is_bearish()
                && current.is_bullish()
                && (previous.low - current.low).abs()
                    <= tweezer_tolerance(previous, current, config)
        }
        _ => false,
    }
}

fn three_back(
    samples: &[OhlcSample],
    index: usize,
) -> Option<(OhlcSample, OhlcSample, OhlcSample)> {
    Some((
        sample_back(samples, index, 2)?,
        sample_back(samples, index, 1)?,
        sample_back(samples, index, 0)?,
    ))
}

pub fn is_morning_star(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    three_back(samples, index).is_some_and(|(first, star, last)| {
        first.is_bearish()
            && long_body(first, config)
            && small_body(star, config)
            && star.body_top() <= first.close
            && last.is_bullish()
            && last.close > first.midpoint()
    })
}

pub fn is_evening_star(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    three_back(samples, index).is_some_and(|(first, star, last)| {
        first.is_bullish()
            && long_body(first, config)
            && small_body(star, config)
            && star.body_bottom() >= first.close
            && last.is_bearish()
            && last.close < first.midpoint()
    })
}

pub fn is_three_white_soldiers(
    samples: &[OhlcSample],
    index: usize,
    config: &PatternConfig,
) -> bool {
    three_back(samples, index).is_some_and(|(first, second, third)| {
        let candles = [first, second, third];
        candles
            .iter()
            .all(|candle| candle.is_bullish() && body_ratio(*candle).is_some_and(|r| r >= 0.5))
            && candles.windows(2).all(|pair| {
                pair[1].close > pair[0].close
                    && pair[1].open > pair[0].open
                    && pair[1].open <= pair[0].close
            })
            && candles
                .iter()
                .all(|candle| candle.upper_shadow() <= config.shadow_tolerance * 2.0 * candle.range())
    })
}

pub fn is_three_black_crows(samples: &[OhlcSample], index: usize, config: &PatternConfig) -> bool {
    three_back(samples, index).is_some_and(|(first, second, third)| {
        let candles = [first, second, third];
        candles
            .iter()
            .all(|candle| candle.is_bearish() && body_ratio(*candle).is_some_and(|r| r >= 0.5))
            && candles.windows(2).all(|pair| {
                pair[1].close < pair[0].close
                    && pair[1].open < pair[0].open
                    && pair[1].open >= pair[0].close
            })
            && candles
                .iter()
                .all(|candle| candle.lower_shadow() <= config.shadow_tolerance * 2.0 * candle.range())
    })
}

/// One formation found at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDetection {
    pub index: usize,
    pub pattern: PatternKind,
    pub label: String,
}

/// Which detectors to run and with which thresholds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternScanConfig {
    /// Enabled formations; empty means all of them.
    #[serde(default)]
    pub enabled: IndexSet<PatternKind>,
    #[serde(default)]
    pub thresholds: PatternConfig,
}

impl PatternScanConfig {
    #[must_use]
    pub fn only(patterns: impl IntoIterator<Item = PatternKind>) -> Self {
        Self {
            enabled: patterns.into_iter().collect(),
            thresholds: PatternConfig::default(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: PatternConfig) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn active(&self) -> Vec<PatternKind> {
        if self.enabled.is_empty() {
            PatternKind::ALL.to_vec()
        } else {
            self.enabled.iter().copied().collect()
        }
    }
}

pub type DetectionsAt = SmallVec<[PatternDetection; 2]>;

/// Index to all formations detected there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternScanResult {
    by_index: BTreeMap<usize, DetectionsAt>,
}

impl PatternScanResult {
    #[must_use]
    pub fn at(&self, index: usize) -> &[PatternDetection] {
        self.by_index.get(&index).map_or(&[], |found| found.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[PatternDetection])> {
        self.by_index
            .iter()
            .map(|(index, found)| (*index, found.as_slice()))
    }

    /// Number of indices with at least one detection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Number of detections across all indices.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_index.values().map(SmallVec::len).sum()
    }

    #[must_use]
    pub fn contains(&self, index: usize, pattern: PatternKind) -> bool {
        self.at(index)
            .iter()
            .any(|detection| detection.pattern == pattern)
    }
}

/// Runs every enabled detector at every index.
#[must_use]
pub fn scan_patterns(samples: &[OhlcSample], config: &PatternScanConfig) -> PatternScanResult {
    let active = config.active();
    let mut by_index = BTreeMap::new();
    for index in 0..samples.len() {
        let found: DetectionsAt = active
            .iter()
            .filter(|pattern| pattern.detect(samples, index, &config.thresholds))
            .map(|pattern| PatternDetection {
                index,
                pattern: *pattern,
                label: pattern.label().to_owned(),
            })
            .collect();
        if !found.is_empty() {
            by_index.insert(index, found);
        }
    }
    PatternScanResult { by_index }
}
