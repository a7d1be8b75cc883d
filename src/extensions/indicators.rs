use serde::{Deserialize, Serialize};

use crate::core::nullable;

/// Indicator output aligned 1:1 with its input; `None` where no value exists.
pub type FittedSeries = Vec<Option<f64>>;

pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Simple moving average over `window` consecutive present samples.
///
/// The first `window - 1` positions, and any window that contains an absent
/// sample, are `None`.
#[must_use]
pub fn calculate_sma(values: &[f64], window: usize) -> FittedSeries {
    let window = window.max(1);
    let mut fitted = vec![None; values.len()];
    if values.len() < window {
        return fitted;
    }
    for (offset, chunk) in values.windows(window).enumerate() {
        fitted[offset + window - 1] = window_mean(chunk);
    }
    fitted
}

/// Exponential moving average with `k = 2 / (window + 1)`.
///
/// The first value is the SMA of the first full window; an absent sample
/// resets the average, which is re-seeded once a full window is available.
#[must_use]
pub fn calculate_ema(values: &[f64], window: usize) -> FittedSeries {
    let window = window.max(1);
    let k = 2.0 / (window as f64 + 1.0);
    let mut fitted = vec![None; values.len()];
    let mut previous: Option<f64> = None;
    let mut run = 0usize;

    for (index, raw) in values.iter().enumerate() {
        let Some(value) = nullable(*raw) else {
            previous = None;
            run = 0;
            continue;
        };
        run += 1;
        let next = match previous {
            Some(prev) => Some(prev + k * (value - prev)),
            None if run >= window => window_mean(&values[index + 1 - window..=index]),
            None => None,
        };
        fitted[index] = next;
        previous = next;
    }
    fitted
}

/// Upper, middle and lower Bollinger bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: FittedSeries,
    pub middle: FittedSeries,
    pub lower: FittedSeries,
}

/// SMA plus/minus `multiplier` population standard deviations.
#[must_use]
pub fn calculate_bollinger(values: &[f64], window: usize, multiplier: f64) -> BollingerBands {
    let window = window.max(1);
    let mut bands = BollingerBands {
        upper: vec![None; values.len()],
        middle: vec![None; values.len()],
        lower: vec![None; values.len()],
    };
    if values.len() < window {
        return bands;
    }

    for (offset, chunk) in values.windows(window).enumerate() {
        let Some(mean) = window_mean(chunk) else {
            continue;
        };
        let variance = chunk
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / window as f64;
        let deviation = variance.sqrt() * multiplier;
        let index = offset + window - 1;
        bands.middle[index] = Some(mean);
        bands.upper[index] = Some(mean + deviation);
        bands.lower[index] = Some(mean - deviation);
    }
    bands
}

/// Relative strength index with Wilder smoothing.
///
/// The first value sits at index `window` and uses plain averages of the
/// first `window` changes. An average loss of zero yields exactly 100.
#[must_use]
pub fn calculate_rsi(values: &[f64], window: usize) -> FittedSeries {
    let window = window.max(1);
    let period = window as f64;
    let mut fitted = vec![None; values.len()];

    let mut previous: Option<f64> = None;
    let mut changes = 0usize;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (index, raw) in values.iter().enumerate() {
        let Some(value) = nullable(*raw) else {
            previous = None;
            changes = 0;
            gain_sum = 0.0;
            loss_sum = 0.0;
            continue;
        };

        if let Some(prev) = previous {
            let change = value - prev;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);
            changes += 1;

            if changes <= window {
                gain_sum += gain;
                loss_sum += loss;
                if changes == window {
                    avg_gain = gain_sum / period;
                    avg_loss = loss_sum / period;
                    fitted[index] = Some(rsi_value(avg_gain, avg_loss));
                }
            } else {
                avg_gain = (avg_gain * (period - 1.0) + gain) / period;
                avg_loss = (avg_loss * (period - 1.0) + loss) / period;
                fitted[index] = Some(rsi_value(avg_gain, avg_loss));
            }
        }
        previous = Some(value);
    }
    fitted
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

fn window_mean(chunk: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    for raw in chunk {
        sum += nullable(*raw)?;
    }
    Some(sum / chunk.len() as f64)
}
