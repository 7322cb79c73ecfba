//! Ridge regression on the engineered features

use crate::data::percent_return;
use crate::error::{ForecastError, Result};
use crate::features::{self, FEATURE_COUNT, FEATURE_WARMUP};
use crate::matrix::{Matrix, DEFAULT_PIVOT_EPSILON};

/// Regularization strength used by the live fit and every backtest refit
pub const MODEL_LAMBDA: f64 = 1e-2;

/// Stronger generic default for ad-hoc regressions outside the model path
pub const GENERIC_LAMBDA: f64 = 1e-3;

/// Ridge regression solver.
///
/// Fits `beta = (XᵗX + λI)⁻¹ Xᵗy`. The L2 penalty keeps the normal
/// equations invertible on the collinear feature set and shrinks the
/// coefficients toward zero.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    lambda: f64,
    pivot_epsilon: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self {
            lambda: MODEL_LAMBDA,
            pivot_epsilon: DEFAULT_PIVOT_EPSILON,
        }
    }
}

impl RidgeRegression {
    /// Create a solver with an explicit penalty and pivot threshold
    pub fn new(lambda: f64, pivot_epsilon: f64) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Lambda must be positive, got {}",
                lambda
            )));
        }
        if !pivot_epsilon.is_finite() || pivot_epsilon <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Pivot epsilon must be positive, got {}",
                pivot_epsilon
            )));
        }

        Ok(Self {
            lambda,
            pivot_epsilon,
        })
    }

    /// Regularization strength
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Fit the coefficient vector for a design matrix and target vector.
    ///
    /// Requires at least as many rows as columns. Bubbles up
    /// [`ForecastError::SingularMatrix`] from the inversion without any
    /// partial result; callers fall back to trend extrapolation.
    pub fn fit(&self, x: &Matrix, y: &[f64]) -> Result<Vec<f64>> {
        if x.rows() != y.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: x.rows(),
                got: y.len(),
            });
        }
        if x.rows() < x.cols() {
            return Err(ForecastError::DataError(format!(
                "Need at least {} training rows, got {}",
                x.cols(),
                x.rows()
            )));
        }

        let xt = x.transpose();
        let mut xtx = xt.multiply(x)?;
        for i in 0..xtx.rows() {
            let value = xtx.get(i, i) + self.lambda;
            xtx.set(i, i, value);
        }

        let inverse = xtx.invert(self.pivot_epsilon)?;
        let xty = xt.multiply_vec(y)?;
        inverse.multiply_vec(&xty)
    }
}

/// Predicted percent return for one feature row
pub fn predict_row(beta: &[f64], features: &[f64]) -> f64 {
    beta.iter().zip(features).map(|(b, f)| b * f).sum()
}

/// Index-aligned feature rows and next-day return targets.
///
/// Row i is built from a cutoff that strictly precedes the return it
/// predicts, so the set carries no look-ahead leakage.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    /// Design-matrix rows
    pub rows: Vec<[f64; FEATURE_COUNT]>,
    /// Percent return realized the day after each row's cutoff
    pub targets: Vec<f64>,
}

impl TrainingSet {
    /// Number of training rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Assemble the design matrix for the solver
    pub fn design_matrix(&self) -> Matrix {
        let mut m = Matrix::zeros(self.rows.len(), FEATURE_COUNT);
        for (r, row) in self.rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                m.set(r, c, value);
            }
        }
        m
    }
}

/// Build the training set over cutoffs `FEATURE_WARMUP..end`.
///
/// Each row uses only closes up to its cutoff; the target is the percent
/// return into the following day, so `end` must not exceed the last index
/// with a known next-day close.
pub fn build_training_set(closes: &[f64], end: usize) -> TrainingSet {
    let mut set = TrainingSet::default();
    let end = end.min(closes.len().saturating_sub(1));

    for cutoff in FEATURE_WARMUP..end {
        let feature = features::build_feature(&closes[..=cutoff]);
        set.rows.push(feature.to_array());
        set.targets.push(percent_return(closes[cutoff], closes[cutoff + 1]));
    }
    set
}
