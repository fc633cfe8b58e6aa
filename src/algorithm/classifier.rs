//! Gender-majority classification
//!
//! A thresholded least-squares model that predicts whether men outnumber
//! women from the three population counts of a row. It is a descriptive
//! check on the series, not a gate: its accuracy is reported and nothing
//! downstream depends on it.

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::models::{Metric, SeriesRow};

type Features = SmallVec<[f64; 3]>;

/// Predictions at or above this are classified as male majority
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Singular values below this share of the largest are treated as zero
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Result of fitting and scoring the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierReport {
    /// Share of held-out rows classified correctly, `None` when a partition is empty
    pub accuracy: Option<f64>,
    /// Rows used for fitting
    pub train_size: usize,
    /// Rows held out for scoring
    pub test_size: usize,
    /// Feature names, in coefficient order
    pub features: Vec<Metric>,
    /// One coefficient per feature
    pub coefficients: Vec<f64>,
    /// Constant term
    pub intercept: f64,
}

/// Linear threshold classifier of male-majority rows
#[derive(Debug, Clone, Copy)]
pub struct GenderMajorityClassifier {
    test_fraction: f64,
    seed: u64,
}

impl GenderMajorityClassifier {
    /// Create a classifier holding out `test_fraction` of the rows
    #[must_use]
    pub const fn new(test_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            seed,
        }
    }

    /// 1 when men outnumber women
    #[must_use]
    pub fn label(row: &SeriesRow) -> u8 {
        u8::from(row.male_adult > row.female_adult)
    }

    /// Fit on a seeded random split of `rows` and score on the held-out part
    pub fn evaluate(&self, rows: &[SeriesRow]) -> ClassifierReport {
        let mut ordered: Vec<&SeriesRow> = rows.iter().collect();
        ordered.sort_by(|a, b| a.region.cmp(&b.region).then(a.year.cmp(&b.year)));

        let mut indices: Vec<usize> = (0..ordered.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let test_size = self.test_size(indices.len());
        let (test_idx, train_idx) = indices.split_at(test_size);

        let sample = |idx: &[usize]| -> (Vec<Features>, Vec<f64>) {
            idx.iter()
                .map(|&i| (features(ordered[i]), f64::from(Self::label(ordered[i]))))
                .unzip()
        };
        let (train_x, train_y) = sample(train_idx);
        let (test_x, test_y) = sample(test_idx);

        let (coefficients, intercept) = fit_least_squares(&train_x, &train_y);

        let accuracy = if train_x.is_empty() || test_x.is_empty() {
            log::warn!(
                "Classifier partition is empty (train {}, test {}), accuracy not reported",
                train_x.len(),
                test_x.len()
            );
            None
        } else {
            let correct = test_x
                .iter()
                .zip(&test_y)
                .filter(|(x, y)| {
                    let score = intercept + x.iter().zip(&coefficients).map(|(a, b)| a * b).sum::<f64>();
                    let predicted = if score >= DECISION_THRESHOLD { 1.0 } else { 0.0 };
                    predicted == **y
                })
                .count();
            #[allow(clippy::cast_precision_loss)]
            let share = correct as f64 / test_x.len() as f64;
            Some(share)
        };

        if let Some(acc) = accuracy {
            log::info!(
                "Gender-majority classifier accuracy {acc:.3} on {} held-out rows",
                test_x.len()
            );
        }

        ClassifierReport {
            accuracy,
            train_size: train_x.len(),
            test_size: test_x.len(),
            features: Metric::ALL.to_vec(),
            coefficients,
            intercept,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn test_size(&self, n: usize) -> usize {
        ((self.test_fraction * n as f64).ceil() as usize).min(n)
    }
}

fn features(row: &SeriesRow) -> Features {
    let record = row.record();
    Metric::ALL.iter().map(|m| m.value(&record)).collect()
}

/// Ordinary least squares with an intercept
///
/// Fits the centred design matrix through its SVD, which gives the
/// minimum-norm coefficients when a feature is a linear combination of
/// the others (the total is always male + female).
fn fit_least_squares(xs: &[Features], ys: &[f64]) -> (Vec<f64>, f64) {
    let k = Metric::ALL.len();
    if xs.is_empty() {
        return (vec![0.0; k], 0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = xs.len() as f64;
    let y_mean = ys.iter().sum::<f64>() / n;
    let x_mean: Vec<f64> = (0..k).map(|j| xs.iter().map(|x| x[j]).sum::<f64>() / n).collect();

    let design = DMatrix::from_fn(xs.len(), k, |i, j| xs[i][j] - x_mean[j]);
    let target = DVector::from_iterator(ys.len(), ys.iter().map(|y| y - y_mean));

    let svd = design.svd(true, true);
    let eps = svd.singular_values.max() * SINGULAR_TOLERANCE;
    let coefficients: Vec<f64> = match svd.solve(&target, eps) {
        Ok(solution) => solution.iter().copied().collect(),
        Err(e) => {
            log::warn!("Least-squares solve failed ({e}), using a constant model");
            vec![0.0; k]
        }
    };

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_mean)
            .map(|(c, m)| c * m)
            .sum::<f64>();
    (coefficients, intercept)
}
