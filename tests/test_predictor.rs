use assert_approx_eq::assert_approx_eq;
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use stock_forecast::fallback::{SHORT_HISTORY_CONFIDENCE, SINGULAR_FIT_CONFIDENCE};
use stock_forecast::rollout::PROJECTION_DAYS;
use stock_forecast::{Candle, ForecastError, StockPredictor};

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let date = start.checked_add_days(Days::new(i as u64)).unwrap();
            Candle::new(date, close, 1_000)
        })
        .collect()
}

#[test]
fn test_short_history_uses_trend_fallback() {
    // Scenario A: 10 ascending closes route to the fallback with the fixed
    // short-history confidence, compounding the mean daily return.
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new().predict(&candles).unwrap();

    assert_eq!(result.confidence, SHORT_HISTORY_CONFIDENCE);
    assert_eq!(result.projection.len(), PROJECTION_DAYS);

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    let avg = returns.iter().sum::<f64>() / returns.len() as f64;

    let mut expected = *closes.last().unwrap();
    for price in &result.projection {
        expected *= 1.0 + avg / 100.0;
        assert_approx_eq!(*price, expected, 1e-9);
    }
    assert_eq!(result.next_price, *result.projection.last().unwrap());
}

#[test]
fn test_perfect_trend_scores_high_confidence() {
    // Scenario B: a 1%/day series is almost exactly learnable, so the
    // walk-forward error is near zero and the confidence near one.
    let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new().predict(&candles).unwrap();

    assert_eq!(result.projection.len(), PROJECTION_DAYS);
    assert!(result.confidence > 0.95, "confidence {}", result.confidence);
    assert!(result.confidence <= 1.0);
    assert!(result.next_price > *closes.last().unwrap());
    for price in &result.projection {
        assert!(price.is_finite());
        assert!(*price > 0.0);
    }
}

#[test]
fn test_singular_fit_uses_fallback_confidence() {
    // Scenario C: a flat series zeroes several feature columns; with the
    // pivot threshold raised above the ridge penalty the elimination
    // reports a singular system and the orchestrator falls back.
    let closes = vec![100.0; 60];
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new()
        .with_pivot_epsilon(1.0)
        .predict(&candles)
        .unwrap();

    assert_eq!(result.confidence, SINGULAR_FIT_CONFIDENCE);
    assert_eq!(result.projection.len(), PROJECTION_DAYS);
    for price in &result.projection {
        assert_approx_eq!(*price, 100.0, 1e-12);
    }
}

#[test]
fn test_too_short_history_is_rejected() {
    // Scenario D: one candle cannot produce any forecast
    let candles = candles_from_closes(&[100.0]);

    let result = StockPredictor::new().predict(&candles);
    assert!(matches!(result, Err(ForecastError::InvalidInput(_))));
}

#[test]
fn test_non_positive_close_is_rejected() {
    let mut candles = candles_from_closes(&[100.0, 101.0, 102.0]);
    candles[1].close = -5.0;
    let result = StockPredictor::new().predict(&candles);
    assert!(matches!(result, Err(ForecastError::InvalidInput(_))));

    let mut candles = candles_from_closes(&[100.0, 101.0, 102.0]);
    candles[2].close = 0.0;
    let result = StockPredictor::new().predict(&candles);
    assert!(matches!(result, Err(ForecastError::InvalidInput(_))));
}

#[test]
fn test_prediction_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let step = Normal::new(0.05, 1.0).unwrap();

    let mut close = 100.0;
    let mut closes = Vec::with_capacity(150);
    for _ in 0..150 {
        let pct: f64 = rng.sample(step);
        close *= 1.0 + pct / 100.0;
        closes.push(close);
    }
    let candles = candles_from_closes(&closes);

    let predictor = StockPredictor::new();
    let first = predictor.predict(&candles).unwrap();
    let second = predictor.predict(&candles).unwrap();

    assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    assert_eq!(first.next_price.to_bits(), second.next_price.to_bits());
    for (a, b) in first.projection.iter().zip(&second.projection) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_confidence_is_always_clamped() {
    // A violently alternating series produces a huge walk-forward error;
    // the confidence still lands inside [0, 1] and the projection stays
    // finite and positive.
    let closes: Vec<f64> = (0..50)
        .map(|i| if i % 2 == 0 { 1.0 } else { 1000.0 })
        .collect();
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new().predict(&candles).unwrap();

    assert!((0.0..=1.0).contains(&result.confidence));
    assert_eq!(result.projection.len(), PROJECTION_DAYS);
    for price in &result.projection {
        assert!(price.is_finite());
        assert!(*price > 0.0);
    }
}

#[test]
fn test_custom_horizon() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new()
        .with_horizon(3)
        .predict(&candles)
        .unwrap();

    assert_eq!(result.projection.len(), 3);
    assert_eq!(result.next_price, *result.projection.last().unwrap());
}

#[test]
fn test_forecast_result_serializes() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let candles = candles_from_closes(&closes);

    let result = StockPredictor::new().predict(&candles).unwrap();
    let json = result.to_json().unwrap();

    assert!(json.contains("next_price"));
    assert!(json.contains("projection"));
    assert!(json.contains("confidence"));
}
