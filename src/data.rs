//! Candle history handling for the forecasting pipeline

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Minimum number of candles required to produce any forecast at all
pub const MIN_HISTORY: usize = 2;

/// One daily price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Closing price, finite and strictly positive
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl Candle {
    /// Create a new candle
    pub fn new(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}

/// Percent change from `previous` to `current`.
///
/// A zero or non-finite prior value yields 0 so degenerate arithmetic never
/// leaks NaN or infinity into downstream features.
pub fn percent_return(previous: f64, current: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Day-over-day percent returns for a close series
pub fn percent_returns(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return Vec::new();
    }

    closes
        .windows(2)
        .map(|w| percent_return(w[0], w[1]))
        .collect()
}

/// Validate a candle history before any model runs on it.
///
/// Histories shorter than [`MIN_HISTORY`] or containing a non-positive or
/// non-finite close cannot produce a forecast and are rejected outright.
pub fn validate_history(candles: &[Candle]) -> Result<()> {
    if candles.len() < MIN_HISTORY {
        return Err(ForecastError::InvalidInput(format!(
            "Need at least {} candles to forecast, got {}",
            MIN_HISTORY,
            candles.len()
        )));
    }

    for candle in candles {
        if !candle.close.is_finite() || candle.close <= 0.0 {
            return Err(ForecastError::InvalidInput(format!(
                "Close {} on {} is not a positive finite price",
                candle.close, candle.date
            )));
        }
    }

    Ok(())
}

/// Data loader for candle histories
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a candle history from a CSV file.
    ///
    /// Columns are detected by name: a date/time column, a close (or price)
    /// column and an optional volume column. Rows are sorted ascending by
    /// date after loading.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();

        let date_idx = Self::detect_column(&headers, &["date", "time"]).ok_or_else(|| {
            ForecastError::DataError("No date column found in data".to_string())
        })?;
        let close_idx = Self::detect_column(&headers, &["close", "price"]).ok_or_else(|| {
            ForecastError::DataError("No close column found in data".to_string())
        })?;
        let volume_idx = Self::detect_column(&headers, &["vol"]);

        let mut candles = Vec::new();
        for record in reader.records() {
            let record = record?;

            let date_field = record.get(date_idx).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|e| {
                ForecastError::DataError(format!("Cannot parse date '{}': {}", date_field, e))
            })?;

            let close_field = record.get(close_idx).unwrap_or_default();
            let close: f64 = close_field.trim().parse().map_err(|e| {
                ForecastError::DataError(format!("Cannot parse close '{}': {}", close_field, e))
            })?;

            let volume = match volume_idx {
                Some(idx) => {
                    let field = record.get(idx).unwrap_or_default().trim();
                    field.parse().unwrap_or(0)
                }
                None => 0,
            };

            candles.push(Candle::new(date, close, volume));
        }

        candles.sort_by_key(|c| c.date);
        Ok(candles)
    }

    /// Find the first header whose lowercased name contains one of the hints
    fn detect_column(headers: &csv::StringRecord, hints: &[&str]) -> Option<usize> {
        for (idx, name) in headers.iter().enumerate() {
            let lower_name = name.to_lowercase();
            if hints.iter().any(|hint| lower_name.contains(hint)) {
                return Some(idx);
            }
        }
        None
    }
}
