//! Time-series feature engineering for the price model

use crate::data::percent_returns;
use statrs::statistics::Statistics;

/// Length of the feature vector
pub const FEATURE_COUNT: usize = 8;

/// First cutoff index with a full long-window feature set. Training rows
/// start here so the slow averages are populated.
pub const FEATURE_WARMUP: usize = 20;

/// Short simple-moving-average window
pub const SHORT_SMA_WINDOW: usize = 5;
/// Long simple-moving-average window
pub const LONG_SMA_WINDOW: usize = 20;
/// Fast exponential-moving-average window
pub const FAST_EMA_WINDOW: usize = 12;
/// Slow exponential-moving-average window
pub const SLOW_EMA_WINDOW: usize = 26;
/// Trailing return window for the volatility feature
pub const VOLATILITY_WINDOW: usize = 20;

/// The engineered features for one cutoff day.
///
/// Named fields rather than an index-addressed array so each feature is
/// self-documenting and independently testable. Every field is finite;
/// anything that cannot be computed from the window defaults to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Intercept term, always 1.0
    pub bias: f64,
    /// Percent change from the second-to-last to the last close
    pub last_return: f64,
    /// Mean of the last 5 closes
    pub sma5: f64,
    /// Mean of the last 20 closes
    pub sma20: f64,
    /// Exponential average with a 12-day smoothing factor
    pub ema12: f64,
    /// Exponential average with a 26-day smoothing factor
    pub ema26: f64,
    /// Population stddev of the trailing percent returns
    pub volatility: f64,
    /// Last close minus the 20-day mean
    pub momentum: f64,
}

impl FeatureVector {
    /// The design-matrix row for this feature vector
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.bias,
            self.last_return,
            self.sma5,
            self.sma20,
            self.ema12,
            self.ema26,
            self.volatility,
            self.momentum,
        ]
    }
}

/// Arithmetic mean of the last `window` values, `None` when the window does
/// not fit.
pub fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(values[values.len() - window..].iter().sum::<f64>() / window as f64)
}

/// Exponential moving average seeded with the first value and folded across
/// the entire window with smoothing factor `2 / (window + 1)`.
pub fn ema(values: &[f64], window: usize) -> Option<f64> {
    let first = values.first()?;
    if window == 0 {
        return None;
    }

    let k_factor = 2.0 / (window as f64 + 1.0);
    let mut current = *first;
    for &value in &values[1..] {
        current = value * k_factor + current * (1.0 - k_factor);
    }
    Some(current)
}

/// Build the feature vector for a close window ending at the cutoff.
///
/// The window is `closes[0..=cutoff]`; returns are derived from the closes
/// themselves.
pub fn build_feature(closes: &[f64]) -> FeatureVector {
    let returns = percent_returns(closes);
    build_feature_from(closes, &returns)
}

/// Build the feature vector from explicit close and return buffers.
///
/// The autoregressive rollout threads its own rolling buffers through this
/// entry point; `returns[i]` is the percent change leading into
/// `closes[i + 1]`.
pub fn build_feature_from(closes: &[f64], returns: &[f64]) -> FeatureVector {
    let last = closes.last().copied().unwrap_or(0.0);
    let sma20 = sma(closes, LONG_SMA_WINDOW);

    let vol_start = returns.len().saturating_sub(VOLATILITY_WINDOW);
    let vol_window = &returns[vol_start..];
    let volatility = if vol_window.is_empty() {
        0.0
    } else {
        vol_window.iter().population_std_dev()
    };

    FeatureVector {
        bias: 1.0,
        last_return: returns.last().copied().unwrap_or(0.0),
        sma5: sma(closes, SHORT_SMA_WINDOW).unwrap_or(0.0),
        sma20: sma20.unwrap_or(0.0),
        ema12: ema(closes, FAST_EMA_WINDOW).unwrap_or(0.0),
        ema26: ema(closes, SLOW_EMA_WINDOW).unwrap_or(0.0),
        volatility,
        momentum: sma20.map(|s| last - s).unwrap_or(0.0),
    }
}
