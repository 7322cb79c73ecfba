//! Prediction orchestration
//!
//! Composes validation, the ridge fit, the walk-forward backtest and the
//! autoregressive rollout into the single entry point: candle history in,
//! forecast result out. Every call is a self-contained, deterministic
//! computation over in-memory data with no state shared across requests.

use crate::backtest;
use crate::data::{self, Candle};
use crate::error::{ForecastError, Result};
use crate::fallback;
use crate::matrix::DEFAULT_PIVOT_EPSILON;
use crate::ridge::{self, RidgeRegression, MODEL_LAMBDA};
use crate::rollout::{self, PROJECTION_DAYS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimum candles before the regression path is used instead of the
/// trend fallback
pub const MIN_MODEL_HISTORY: usize = 30;

/// A short-horizon price forecast with a calibrated confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Final projected price; always the last element of the projection
    pub next_price: f64,
    /// Projected daily prices, oldest first
    pub projection: Vec<f64>,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl ForecastResult {
    fn from_projection(projection: Vec<f64>, confidence: f64) -> Self {
        let next_price = projection.last().copied().unwrap_or(0.0);
        Self {
            next_price,
            projection,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Serialize the result to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Price forecaster over an ordered daily candle history.
///
/// The defaults match the production model; the penalty, pivot threshold
/// and horizon are configurable so tests can steer the numeric paths.
#[derive(Debug, Clone)]
pub struct StockPredictor {
    lambda: f64,
    pivot_epsilon: f64,
    horizon: usize,
}

impl Default for StockPredictor {
    fn default() -> Self {
        Self {
            lambda: MODEL_LAMBDA,
            pivot_epsilon: DEFAULT_PIVOT_EPSILON,
            horizon: PROJECTION_DAYS,
        }
    }
}

impl StockPredictor {
    /// Create a predictor with the default model parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the ridge penalty
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Override the singular-pivot threshold
    pub fn with_pivot_epsilon(mut self, pivot_epsilon: f64) -> Self {
        self.pivot_epsilon = pivot_epsilon;
        self
    }

    /// Override the projection horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Forecast the price path for an ascending daily candle history.
    ///
    /// Histories shorter than [`crate::data::MIN_HISTORY`] candles or with a
    /// non-positive close are rejected as [`ForecastError::InvalidInput`].
    /// Histories shorter than [`MIN_MODEL_HISTORY`] candles and singular
    /// fits silently degrade to the trend fallback with a reduced, fixed
    /// confidence; neither surfaces as an error.
    pub fn predict(&self, candles: &[Candle]) -> Result<ForecastResult> {
        data::validate_history(candles)?;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        if closes.len() < MIN_MODEL_HISTORY {
            debug!(
                candles = closes.len(),
                "history too short for the model, extrapolating trend"
            );
            let projection = fallback::extrapolate(&closes, self.horizon);
            return Ok(ForecastResult::from_projection(
                projection,
                fallback::SHORT_HISTORY_CONFIDENCE,
            ));
        }

        let solver = RidgeRegression::new(self.lambda, self.pivot_epsilon)?;
        let training = ridge::build_training_set(&closes, closes.len() - 1);
        let beta = match solver.fit(&training.design_matrix(), &training.targets) {
            Ok(beta) => beta,
            Err(ForecastError::SingularMatrix) => {
                warn!("ridge fit hit a singular system, extrapolating trend");
                let projection = fallback::extrapolate(&closes, self.horizon);
                return Ok(ForecastResult::from_projection(
                    projection,
                    fallback::SINGULAR_FIT_CONFIDENCE,
                ));
            }
            Err(err) => return Err(err),
        };

        let report = backtest::evaluate(&closes, &solver, &beta, &training);
        let returns = data::percent_returns(&closes);
        let projection = rollout::project(&closes, &returns, &beta, self.horizon);

        Ok(ForecastResult::from_projection(
            projection,
            report.confidence,
        ))
    }
}
