use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel-overlays")]
use rayon::prelude::*;

use crate::core::nullable;
use crate::error::{ChartError, ChartResult};
use crate::extensions::indicators::{
    DEFAULT_BOLLINGER_MULTIPLIER, FittedSeries, calculate_bollinger, calculate_ema, calculate_rsi,
    calculate_sma,
};

const DEGENERATE_EPSILON: f64 = 1e-12;

/// Overlay fit drawn on top of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrendLineKind {
    Linear,
    Cubic,
    MovingAverage {
        #[serde(default)]
        window: Option<usize>,
    },
    ExponentialMovingAverage {
        #[serde(default)]
        window: Option<usize>,
    },
    BollingerUpper {
        #[serde(default)]
        window: Option<usize>,
    },
    BollingerLower {
        #[serde(default)]
        window: Option<usize>,
    },
    Rsi {
        #[serde(default)]
        window: Option<usize>,
    },
}

impl TrendLineKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::MovingAverage { .. } => "sma",
            Self::ExponentialMovingAverage { .. } => "ema",
            Self::BollingerUpper { .. } => "bollinger upper",
            Self::BollingerLower { .. } => "bollinger lower",
            Self::Rsi { .. } => "rsi",
        }
    }
}

/// Window used when a moving fit does not name one.
#[must_use]
pub fn default_window(len: usize) -> usize {
    (len / 5).max(2)
}

fn present_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| nullable(*value).map(|value| (index as f64, value)))
        .collect()
}

/// Least-squares line through `(index, value)` for every present value,
/// evaluated at every index.
pub fn linear_regression(values: &[f64]) -> ChartResult<FittedSeries> {
    let points = present_points(values);
    if points.len() < 2 {
        return Err(ChartError::InsufficientData {
            required: 2,
            actual: points.len(),
        });
    }

    let count = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / count;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &points {
        sxx += (x - mean_x).powi(2);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx < DEGENERATE_EPSILON {
        return Err(ChartError::DegenerateFit(
            "independent variable has no variance".to_owned(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok((0..values.len())
        .map(|index| Some(intercept + slope * index as f64))
        .collect())
}

/// Third-degree least-squares polynomial, falling back to a line when there
/// are fewer than four points or the normal equations are singular.
pub fn cubic_regression(values: &[f64]) -> ChartResult<FittedSeries> {
    let points = present_points(values);
    if points.len() < 4 {
        debug!(points = points.len(), "cubic fit falls back to linear");
        return linear_regression(values);
    }

    // Normalizing x keeps the x^6 sums well conditioned.
    let scale = (values.len().saturating_sub(1)).max(1) as f64;
    let mut matrix = [[0.0; 4]; 4];
    let mut rhs = [0.0; 4];
    for (x, y) in &points {
        let x = x / scale;
        let powers = [1.0, x, x * x, x * x * x];
        for row in 0..4 {
            for col in 0..4 {
                matrix[row][col] += powers[row] * powers[col];
            }
            rhs[row] += powers[row] * y;
        }
    }

    let Some(coefficients) = solve_linear_system(matrix, rhs) else {
        debug!("cubic normal equations are singular, falling back to linear");
        return linear_regression(values);
    };

    Ok((0..values.len())
        .map(|index| {
            let x = index as f64 / scale;
            Some(
                coefficients[0]
                    + coefficients[1] * x
                    + coefficients[2] * x * x
                    + coefficients[3] * x * x * x,
            )
        })
        .collect())
}

/// Solves `matrix * x = rhs` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot is numerically zero.
#[must_use]
pub fn solve_linear_system<const N: usize>(
    mut matrix: [[f64; N]; N],
    mut rhs: [f64; N],
) -> Option<[f64; N]> {
    for column in 0..N {
        let pivot_row = (column..N).max_by(|a, b| {
            matrix[*a][column]
                .abs()
                .total_cmp(&matrix[*b][column].abs())
        })?;
        if matrix[pivot_row][column].abs() < DEGENERATE_EPSILON {
            return None;
        }
        matrix.swap(column, pivot_row);
        rhs.swap(column, pivot_row);

        for row in column + 1..N {
            let factor = matrix[row][column] / matrix[column][column];
            for k in column..N {
                matrix[row][k] -= factor * matrix[column][k];
            }
            rhs[row] -= factor * rhs[column];
        }
    }

    let mut solution = [0.0; N];
    for row in (0..N).rev() {
        let tail: f64 = (row + 1..N)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    solution
        .iter()
        .all(|value| value.is_finite())
        .then_some(solution)
}

/// SMA trend; identical to [`calculate_sma`] for the resolved window.
pub fn moving_average_trend(values: &[f64], window: Option<usize>) -> ChartResult<FittedSeries> {
    if values.len() < 4 {
        debug!(len = values.len(), "moving average falls back to linear");
        return linear_regression(values);
    }
    Ok(calculate_sma(
        values,
        window.unwrap_or_else(|| default_window(values.len())),
    ))
}

/// EMA trend; identical to [`calculate_ema`] for the resolved window.
pub fn exponential_trend(values: &[f64], window: Option<usize>) -> ChartResult<FittedSeries> {
    if values.len() < 4 {
        debug!(len = values.len(), "exponential average falls back to linear");
        return linear_regression(values);
    }
    Ok(calculate_ema(
        values,
        window.unwrap_or_else(|| default_window(values.len())),
    ))
}

/// Fits `kind` to `values`. Pure; safe to call from several threads.
pub fn fit_trend(values: &[f64], kind: TrendLineKind) -> ChartResult<FittedSeries> {
    let resolve = |window: Option<usize>| window.unwrap_or_else(|| default_window(values.len()));
    match kind {
        TrendLineKind::Linear => linear_regression(values),
        TrendLineKind::Cubic => cubic_regression(values),
        TrendLineKind::MovingAverage { window } => moving_average_trend(values, window),
        TrendLineKind::ExponentialMovingAverage { window } => exponential_trend(values, window),
        TrendLineKind::BollingerUpper { window } => Ok(calculate_bollinger(
            values,
            resolve(window),
            DEFAULT_BOLLINGER_MULTIPLIER,
        )
        .upper),
        TrendLineKind::BollingerLower { window } => Ok(calculate_bollinger(
            values,
            resolve(window),
            DEFAULT_BOLLINGER_MULTIPLIER,
        )
        .lower),
        TrendLineKind::Rsi { window } => Ok(calculate_rsi(values, resolve(window))),
    }
}

/// Fits a batch of independent trends.
///
/// With the `parallel-overlays` feature the batch fans out over rayon;
/// results keep request order either way.
#[must_use]
pub fn fit_trends(requests: &[(&[f64], TrendLineKind)]) -> Vec<ChartResult<FittedSeries>> {
    #[cfg(feature = "parallel-overlays")]
    {
        requests
            .par_iter()
            .map(|(values, kind)| fit_trend(values, *kind))
            .collect()
    }

    #[cfg(not(feature = "parallel-overlays"))]
    {
        requests
            .iter()
            .map(|(values, kind)| fit_trend(values, *kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::solve_linear_system;

    #[test]
    fn solver_handles_pivoting() {
        // First pivot is zero without row exchange.
        let matrix = [[0.0, 1.0], [2.0, 1.0]];
        let solution = solve_linear_system(matrix, [3.0, 5.0]).expect("solvable");
        assert!((solution[0] - 1.0).abs() < 1e-12);
        assert!((solution[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn solver_rejects_singular_matrix() {
        let matrix = [[1.0, 2.0], [2.0, 4.0]];
        assert!(solve_linear_system(matrix, [1.0, 2.0]).is_none());
    }
}
