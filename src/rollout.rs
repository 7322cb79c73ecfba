//! Autoregressive multi-step price projection

use crate::features;
use crate::ridge;

/// Number of days projected forward
pub const PROJECTION_DAYS: usize = 5;

/// Floor applied when a step would drive the price non-positive
const PRICE_FLOOR: f64 = 1e-6;

/// Project `horizon` daily prices forward from the fitted coefficients.
///
/// Each step builds a feature vector from local rolling close/return
/// buffers, predicts the next percent return, converts it to a price and
/// feeds both back into the buffers. The forecast feeds its own next-step
/// features, so errors compound across steps by design. Always emits
/// exactly `horizon` prices with no early exit.
pub fn project(closes: &[f64], returns: &[f64], beta: &[f64], horizon: usize) -> Vec<f64> {
    let mut rolling_closes = closes.to_vec();
    let mut rolling_returns = returns.to_vec();
    let mut projection = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let feature = features::build_feature_from(&rolling_closes, &rolling_returns);
        let mut predicted_return = ridge::predict_row(beta, &feature.to_array());
        if !predicted_return.is_finite() {
            predicted_return = 0.0;
        }

        let last = rolling_closes.last().copied().unwrap_or(PRICE_FLOOR);
        let mut next = last * (1.0 + predicted_return / 100.0);
        if !next.is_finite() || next <= 0.0 {
            next = PRICE_FLOOR;
        }

        rolling_closes.push(next);
        rolling_returns.push(predicted_return);
        projection.push(next);
    }

    projection
}
