//! Trend-extrapolation fallback forecast
//!
//! Used when the history is too short for the regression or when a fit is
//! numerically singular. The confidence constants are policy values, not
//! derived quantities.

use crate::data::percent_returns;
use statrs::statistics::Statistics;

/// Confidence assigned when the history is too short for the model
pub const SHORT_HISTORY_CONFIDENCE: f64 = 0.2;

/// Confidence assigned when the ridge fit was singular
pub const SINGULAR_FIT_CONFIDENCE: f64 = 0.1;

/// Compound the mean daily percent return forward from the last close.
pub fn extrapolate(closes: &[f64], horizon: usize) -> Vec<f64> {
    let returns = percent_returns(closes);
    let avg_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().mean()
    };

    let mut last = closes.last().copied().unwrap_or(0.0);
    let mut projection = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        last *= 1.0 + avg_return / 100.0;
        projection.push(last);
    }
    projection
}
