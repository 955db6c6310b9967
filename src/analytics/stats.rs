//! Descriptive statistics shared by the analyzers

use serde::Serialize;

/// Arithmetic mean, `None` for an empty series
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population mean and standard deviation (denominator `n`)
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some((mean, variance.sqrt()))
}

/// Every value equal to the first. Empty input counts as constant.
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Trailing moving average.
///
/// Point `i` averages the window ending at `i`; the first `window - 1` points
/// average only what is available. A window of 0 is treated as 1.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = 0.0;

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            sum += value;
            if i >= window {
                sum -= values[i - window];
            }
            sum / (i + 1).min(window) as f64
        })
        .collect()
}

/// Summary of one metric over an analysis window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Days with at least one sample
    pub days: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    /// `None` for an empty series
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            days: values.len(),
            mean: mean(values)?,
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
