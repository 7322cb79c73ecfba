//! Walk-forward backtest and confidence scoring
//!
//! In-sample fit quality overstates accuracy, so the confidence score is
//! driven by repeated train-on-past/predict-next-day splits that simulate
//! real deployment, with the in-sample R-squared as a minor adjustment.

use crate::features;
use crate::ridge::{self, RidgeRegression, TrainingSet};
use statrs::statistics::Statistics;
use tracing::debug;

/// First split index of the walk-forward loop
pub const FIRST_SPLIT: usize = 30;

/// Step between split indices, bounding the number of refits
pub const BACKTEST_STRIDE: usize = 3;

/// Minimum training rows for a split to be evaluated
pub const MIN_TRAIN_ROWS: usize = 5;

/// Mean absolute percentage error that floors the backtest confidence to 0
pub const MAPE_CONFIDENCE_FLOOR: f64 = 0.10;

const BACKTEST_WEIGHT: f64 = 0.8;
const R_SQUARED_WEIGHT: f64 = 0.2;

/// Outcome of a walk-forward evaluation
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Mean absolute percentage error across evaluated splits, 0 when no
    /// split produced an error
    pub mape: f64,
    /// In-sample coefficient of determination of the full-sample fit
    pub r_squared: f64,
    /// Number of splits that produced an error value
    pub splits_evaluated: usize,
    /// Blended confidence, clamped to [0, 1]
    pub confidence: f64,
}

impl std::fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Backtest Report:")?;
        writeln!(f, "  MAPE:       {:.4}", self.mape)?;
        writeln!(f, "  R-squared:  {:.4}", self.r_squared)?;
        writeln!(f, "  Splits:     {}", self.splits_evaluated)?;
        writeln!(f, "  Confidence: {:.4}", self.confidence)?;
        Ok(())
    }
}

/// Absolute percentage errors from walk-forward splits.
///
/// For each split s the solver is refit on data available up to s only,
/// then predicts the close at s + 1. Splits with too few rows or a
/// singular refit are skipped without recording an error. The fits are
/// mutually independent and their contribution to the mean is
/// order-independent.
pub fn walk_forward_errors(closes: &[f64], solver: &RidgeRegression) -> Vec<f64> {
    let mut errors = Vec::new();
    if closes.len() < FIRST_SPLIT + 2 {
        return errors;
    }

    let mut split = FIRST_SPLIT;
    while split + 1 < closes.len() {
        let set = ridge::build_training_set(closes, split);
        if set.len() >= MIN_TRAIN_ROWS {
            match solver.fit(&set.design_matrix(), &set.targets) {
                Ok(beta) => {
                    let feature = features::build_feature(&closes[..=split]);
                    let predicted_return = ridge::predict_row(&beta, &feature.to_array());
                    let predicted = closes[split] * (1.0 + predicted_return / 100.0);
                    let actual = closes[split + 1];
                    if actual != 0.0 && predicted.is_finite() {
                        errors.push((predicted - actual).abs() / actual.abs());
                    }
                }
                Err(err) => {
                    debug!(split, %err, "skipping walk-forward split");
                }
            }
        }
        split += BACKTEST_STRIDE;
    }

    errors
}

/// In-sample coefficient of determination of a fitted model.
///
/// The total sum of squares is floored at 1 so a degenerate, constant
/// target series cannot divide by zero.
pub fn r_squared(beta: &[f64], training: &TrainingSet) -> f64 {
    if training.is_empty() {
        return 0.0;
    }

    let mean = training.targets.iter().mean();
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (row, &target) in training.rows.iter().zip(&training.targets) {
        let predicted = ridge::predict_row(beta, row);
        ss_res += (target - predicted) * (target - predicted);
        ss_tot += (target - mean) * (target - mean);
    }

    1.0 - ss_res / ss_tot.max(1.0)
}

/// Run the walk-forward backtest and blend it with the in-sample fit.
///
/// A 10% mean error floors the backtest confidence to 0 and a 0% error
/// ceilings it at 1; histories too short to evaluate any split score 0.
/// Backtest evidence dominates the blend.
pub fn evaluate(
    closes: &[f64],
    solver: &RidgeRegression,
    beta: &[f64],
    training: &TrainingSet,
) -> BacktestReport {
    let errors = walk_forward_errors(closes, solver);
    let splits_evaluated = errors.len();

    let (mape, backtest_confidence) = if errors.is_empty() {
        (0.0, 0.0)
    } else {
        let mape = errors.iter().mean();
        let confidence = (1.0 - mape / MAPE_CONFIDENCE_FLOOR).clamp(0.0, 1.0);
        (mape, confidence)
    };

    let r2 = r_squared(beta, training);
    let confidence = (BACKTEST_WEIGHT * backtest_confidence
        + R_SQUARED_WEIGHT * r2.clamp(0.0, 1.0))
    .clamp(0.0, 1.0);

    BacktestReport {
        mape,
        r_squared: r2,
        splits_evaluated,
        confidence,
    }
}
