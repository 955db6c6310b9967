//! Anomaly Detector
//!
//! Flags samples whose population Z-score exceeds a threshold.

use crate::analytics::stats::{is_constant, mean_std};
use serde::Serialize;
use std::fmt;

/// Default |Z| above which a sample is flagged
pub const DEFAULT_THRESHOLD: f64 = 2.5;

/// Minimum series length for detection
const MIN_SAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyKind {
    #[serde(rename = "unusually high")]
    UnusuallyHigh,
    #[serde(rename = "unusually low")]
    UnusuallyLow,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::UnusuallyHigh => write!(f, "unusually high"),
            AnomalyKind::UnusuallyLow => write!(f, "unusually low"),
        }
    }
}

/// A flagged sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Position in the source series
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub kind: AnomalyKind,
}

/// Flag every sample with `|Z| > threshold`.
///
/// Uses the population standard deviation. A constant series has no
/// anomalies at any threshold, even when rounding in the mean leaves a
/// residual deviation. Fewer than three samples yield an empty list.
pub fn detect(series: &[f64], threshold: f64) -> Vec<Anomaly> {
    if series.len() < MIN_SAMPLES || is_constant(series) {
        return Vec::new();
    }

    let Some((mean, std_dev)) = mean_std(series) else {
        return Vec::new();
    };

    series
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = if std_dev == 0.0 {
                0.0
            } else {
                (value - mean) / std_dev
            };

            (z_score.abs() > threshold).then(|| Anomaly {
                index,
                value,
                z_score,
                kind: if z_score > 0.0 {
                    AnomalyKind::UnusuallyHigh
                } else {
                    AnomalyKind::UnusuallyLow
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_spike() {
        let series = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 20.0];
        let anomalies = detect(&series, 2.0);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 9);
        assert_eq!(anomalies[0].value, 20.0);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnusuallyHigh);
        assert!((anomalies[0].z_score - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_flags_dip() {
        let series = [7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 1.0];
        let anomalies = detect(&series, DEFAULT_THRESHOLD);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnusuallyLow);
        assert!(anomalies[0].z_score < 0.0);
    }

    #[test]
    fn test_constant_series_has_no_anomalies() {
        let series = [4.0; 12];
        for threshold in [0.0, 0.5, 2.5] {
            assert!(detect(&series, threshold).is_empty());
        }
    }

    #[test]
    fn test_inexact_constant_series_has_no_anomalies() {
        // The mean of [0.1; 10] is not exactly 0.1
        let series = [0.1; 10];
        assert!(detect(&series, 0.5).is_empty());
        assert!(detect(&series, 0.0).is_empty());
    }

    #[test]
    fn test_too_short() {
        assert!(detect(&[1.0, 100.0], 0.1).is_empty());
    }

    #[test]
    fn test_lower_threshold_never_flags_fewer() {
        let series = [3.0, 9.0, 4.0, 5.0, 1.0, 6.0, 8.0, 2.0, 10.0, 5.5];
        let mut previous = usize::MAX;
        for threshold in [0.0, 0.5, 1.0, 1.5, 2.0, 2.5] {
            let count = detect(&series, threshold).len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn test_kind_serializes_as_phrase() {
        let json = serde_json::to_string(&AnomalyKind::UnusuallyLow).unwrap();
        assert_eq!(json, "\"unusually low\"");
    }
}
