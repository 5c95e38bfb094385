//! NDVI trend estimation and horizon forecasting
//!
//! Fits an ordinary least-squares line over the recent sample window and
//! projects it forward with a small random perturbation and a confidence
//! that decays with horizon distance. The random source is injected so
//! forecasts are reproducible under test.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::ndvi::NdviSample;
use crate::models::stress::{classify_value, StressLevel};

/// Number of most-recent samples the trend regression looks at
pub const TREND_WINDOW: usize = 5;

/// Minimum history required before a forecast is produced
pub const MIN_FORECAST_SAMPLES: usize = 3;

/// Half-width of the symmetric noise applied to each projected value
pub const NOISE_AMPLITUDE: f64 = 0.01;

/// How a forecast was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    LinearRegression,
    InsufficientData,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::LinearRegression => "linear_regression",
            ForecastMethod::InsufficientData => "insufficient_data",
        }
    }
}

/// A single projected day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Projected NDVI, clamped to [0, 1]
    pub predicted_ndvi: f64,
    pub stress_level: StressLevel,
    /// Heuristic certainty in [0.5, 0.9], non-increasing with distance
    pub confidence: f64,
}

/// A full horizon projection for one farm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendForecast {
    pub method: ForecastMethod,
    pub trend_slope: f64,
    pub horizon_days: u32,
    pub points: Vec<ForecastPoint>,
}

impl TrendForecast {
    fn insufficient(horizon_days: u32) -> Self {
        Self {
            method: ForecastMethod::InsufficientData,
            trend_slope: 0.0,
            horizon_days,
            points: Vec::new(),
        }
    }
}

/// Ordinary least-squares slope of NDVI against day index.
///
/// Takes the last `TREND_WINDOW` readings of a date-descending history in
/// chronological order, so a declining crop yields a negative slope.
/// Fewer than 2 samples yield a flat trend.
pub fn trend_slope(samples: &[NdviSample]) -> f64 {
    let window: Vec<f64> = samples
        .iter()
        .take(TREND_WINDOW)
        .rev()
        .map(|s| s.ndvi)
        .collect();

    if window.len() < 2 {
        return 0.0;
    }

    let n = window.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (i, ndvi) in window.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += ndvi;
        sum_xy += x * ndvi;
        sum_x2 += x * x;
    }

    // With distinct index x-values the denominator cannot vanish for n >= 2
    (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x)
}

/// Confidence for the `day`-th projected point, floored at 0.5
pub fn point_confidence(day: u32, horizon_days: u32) -> f64 {
    (0.9 - (day as f64 / horizon_days as f64) * 0.4).max(0.5)
}

/// Project NDVI forward from a date-descending sample history.
///
/// Requires at least `MIN_FORECAST_SAMPLES`; shorter histories produce an
/// empty forecast tagged `insufficient_data`. Each projected value carries
/// its own stress classification (the trend is already in the projection,
/// so points are classified without re-escalation).
pub fn forecast<R: Rng>(
    samples: &[NdviSample],
    horizon_days: u32,
    rng: &mut R,
) -> TrendForecast {
    if samples.len() < MIN_FORECAST_SAMPLES {
        return TrendForecast::insufficient(horizon_days);
    }

    let slope = trend_slope(samples);
    let latest = &samples[0];

    let points = (1..=horizon_days)
        .map(|day| {
            let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
            let predicted = (latest.ndvi + slope * day as f64 + noise).clamp(0.0, 1.0);

            ForecastPoint {
                date: latest.date + Duration::days(day as i64),
                predicted_ndvi: predicted,
                stress_level: classify_value(predicted, 0.0).level,
                confidence: point_confidence(day, horizon_days),
            }
        })
        .collect();

    TrendForecast {
        method: ForecastMethod::LinearRegression,
        trend_slope: slope,
        horizon_days,
        points,
    }
}
