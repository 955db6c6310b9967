//! Trend Predictor
//!
//! Fits an ordinary least-squares line over sample positions and extrapolates
//! it forward.

use serde::Serialize;
use std::fmt;

/// Slopes within ±this band count as flat
const STABLE_BAND: f64 = 0.1;

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > STABLE_BAND {
            TrendDirection::Improving
        } else if slope < -STABLE_BAND {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Declining => write!(f, "declining"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Fitted line plus forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    /// Forecast for the next `horizon` positions, never negative
    pub predictions: Vec<f64>,
    pub trend: TrendDirection,
}

/// Fit `y = slope * x + intercept` over `x = 0..n` and forecast `horizon`
/// further points.
///
/// Returns `None` for fewer than two samples.
pub fn predict(series: &[f64], horizon: usize) -> Option<TrendResult> {
    if series.len() < 2 {
        return None;
    }

    let n = series.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in series.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    // Positions 0..n are distinct, so this is strictly positive for n >= 2
    let denominator = n * sum_x2 - sum_x * sum_x;
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let predictions = (0..horizon)
        .map(|step| {
            let x = (series.len() + step) as f64;
            (slope * x + intercept).max(0.0)
        })
        .collect();

    Some(TrendResult {
        slope,
        intercept,
        predictions,
        trend: TrendDirection::from_slope(slope),
    })
}
