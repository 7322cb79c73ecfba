//! # Stock Forecast
//!
//! A Rust library for short-horizon stock price forecasting over daily
//! candle histories.
//!
//! ## Features
//!
//! - Fixed 8-feature engineering (returns, moving averages, volatility,
//!   momentum) over a price window
//! - Ridge regression fit through Gauss-Jordan elimination with partial
//!   pivoting
//! - Autoregressive 5-step rollout that feeds each prediction back into
//!   its own feature window
//! - Walk-forward backtest that scores a calibrated confidence in [0, 1]
//! - Trend-extrapolation fallback for short histories and singular fits
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Days, NaiveDate};
//! use stock_forecast::{Candle, StockPredictor};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
//! let candles: Vec<Candle> = (0..60u64)
//!     .map(|i| {
//!         let date = start.checked_add_days(Days::new(i)).unwrap();
//!         Candle::new(date, 100.0 * 1.01f64.powi(i as i32), 1_000)
//!     })
//!     .collect();
//!
//! let result = StockPredictor::new().predict(&candles).unwrap();
//! assert_eq!(result.projection.len(), 5);
//! assert!((0.0..=1.0).contains(&result.confidence));
//! ```

pub mod backtest;
pub mod data;
pub mod error;
pub mod fallback;
pub mod features;
pub mod matrix;
pub mod predictor;
pub mod ridge;
pub mod rollout;

// Re-export commonly used types
pub use crate::data::{Candle, DataLoader};
pub use crate::error::ForecastError;
pub use crate::features::FeatureVector;
pub use crate::matrix::Matrix;
pub use crate::predictor::{ForecastResult, StockPredictor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
