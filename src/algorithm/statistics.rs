//! Numeric helpers shared by the pipeline stages
//!
//! Small, allocation-light implementations of the handful of statistics the
//! pipeline needs: moments, z-scores, ordinary least squares on one
//! regressor, fit-quality scores and rounding.

use crate::config::ZeroDenominatorPolicy;

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Population standard deviation (divides by n), `None` for an empty slice
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    #[allow(clippy::cast_precision_loss)]
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Absolute z-score of every value
///
/// When the values do not vary every score is 0.
#[must_use]
pub fn abs_z_scores(values: &[f64]) -> Vec<f64> {
    let (Some(mu), Some(sigma)) = (mean(values), population_std(values)) else {
        return Vec::new();
    };
    if sigma == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| ((v - mu) / sigma).abs()).collect()
}

/// Slope and intercept of a fitted line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Change in y per unit of x
    pub slope: f64,
    /// Value of y at x = 0
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares of `ys` on `xs`
///
/// Sums are taken around the means, which keeps the fit exact for constant
/// series (slope exactly 0). Returns `None` for fewer than two points or when
/// every x is identical.
#[must_use]
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let x_mean = mean(xs)?;
    let y_mean = mean(ys)?;

    let (sxy, sxx) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Coefficient of determination of `predicted` against `actual`
///
/// A constant `actual` has no variance to explain: the score is 1.0 when the
/// predictions match it exactly and 0.0 otherwise.
#[must_use]
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(y_mean) = mean(actual) else {
        return f64::NAN;
    };
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean squared error of `predicted` against `actual`
#[must_use]
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n
}

/// Round to the nearest integer, ties to even
#[must_use]
pub fn round_count(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to one decimal place, ties to even
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Result of a guarded ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    /// The value to report
    pub value: Option<f64>,
    /// Whether the denominator was zero and the policy was applied
    pub zero_denominator: bool,
}

/// `numerator / denominator × 100`, rounded to one decimal
///
/// A zero denominator never divides; the policy's fallback is reported instead.
#[must_use]
pub fn percent(numerator: f64, denominator: f64, policy: ZeroDenominatorPolicy) -> Ratio {
    if denominator == 0.0 {
        return Ratio {
            value: policy.fallback(),
            zero_denominator: true,
        };
    }
    Ratio {
        value: Some(round_one_decimal(numerator / denominator * 100.0)),
        zero_denominator: false,
    }
}

/// Linear interpolation between two known points
#[must_use]
pub fn interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
