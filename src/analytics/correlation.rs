//! Correlation Analyzer
//!
//! Calculates Pearson correlation coefficients between two wellness metrics
//! aligned on calendar days, grades their strength, and phrases the finding
//! as a one-sentence insight.

use crate::analytics::aligner::{align, DailySeries};
use crate::analytics::stats::is_constant;
use crate::analytics::engine::WellnessAnalytics;
use crate::analytics::types::MetricKind;
use crate::cache::cache_key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of overlapping days before a coefficient is reported
pub const MIN_OVERLAP_DAYS: usize = 5;

/// Human-readable grade of |r|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
    #[serde(rename = "Very Weak")]
    VeryWeak,
    /// No coefficient available
    Unknown,
}

impl CorrelationStrength {
    fn adverb(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "strongly",
            CorrelationStrength::Moderate => "moderately",
            CorrelationStrength::Weak => "weakly",
            CorrelationStrength::VeryWeak => "very weakly",
            CorrelationStrength::Unknown => "",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationStrength::Strong => write!(f, "Strong"),
            CorrelationStrength::Moderate => write!(f, "Moderate"),
            CorrelationStrength::Weak => write!(f, "Weak"),
            CorrelationStrength::VeryWeak => write!(f, "Very Weak"),
            CorrelationStrength::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Outcome of correlating two metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// First metric
    pub metric_a: MetricKind,
    /// Second metric
    pub metric_b: MetricKind,
    /// Pearson coefficient in [-1, 1]; `None` when data was insufficient
    pub coefficient: Option<f64>,
    pub strength: CorrelationStrength,
    /// Number of overlapping days used
    pub sample_size: usize,
    pub insight: String,
}

impl CorrelationResult {
    /// Whether |r| reaches `threshold`
    pub fn is_notable(&self, threshold: f64) -> bool {
        self.coefficient.map_or(false, |r| r.abs() >= threshold)
    }
}

/// Pearson product-moment correlation.
///
/// Returns `None` for empty or unequal-length input, and when non-finite
/// values leave no meaningful coefficient. A constant operand makes the
/// denominator zero; that case is defined as `Some(0.0)`.
pub fn correlate(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    if is_constant(a) || is_constant(b) {
        return Some(0.0);
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cross = 0.0;
    let mut sq_a = 0.0;
    let mut sq_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        sq_a += dx * dx;
        sq_b += dy * dy;
    }

    let denominator = (sq_a * sq_b).sqrt();
    if denominator == 0.0 {
        return Some(0.0);
    }

    let r = cross / denominator;
    if !r.is_finite() {
        return None;
    }

    // Rounding can push a perfect fit a hair past ±1
    Some(r.clamp(-1.0, 1.0))
}

/// Grade a coefficient by its absolute value
pub fn interpret(r: Option<f64>) -> CorrelationStrength {
    let Some(r) = r else {
        return CorrelationStrength::Unknown;
    };

    let abs_r = r.abs();
    if abs_r >= 0.7 {
        CorrelationStrength::Strong
    } else if abs_r >= 0.4 {
        CorrelationStrength::Moderate
    } else if abs_r >= 0.2 {
        CorrelationStrength::Weak
    } else {
        CorrelationStrength::VeryWeak
    }
}

/// Correlate two daily series, requiring `min_days` overlapping days
pub fn correlate_daily(
    metric_a: MetricKind,
    series_a: &DailySeries,
    metric_b: MetricKind,
    series_b: &DailySeries,
    min_days: usize,
) -> CorrelationResult {
    let (aligned_a, aligned_b) = align(series_a, series_b);
    let sample_size = aligned_a.len();

    if sample_size < min_days {
        return CorrelationResult {
            metric_a,
            metric_b,
            coefficient: None,
            strength: CorrelationStrength::Unknown,
            sample_size,
            insight: format!(
                "Insufficient data: need at least {} days with both {} and {} logged (found {}).",
                min_days,
                metric_a.label(),
                metric_b.label(),
                sample_size
            ),
        };
    }

    let coefficient = correlate(&aligned_a, &aligned_b);
    let strength = interpret(coefficient);

    CorrelationResult {
        metric_a,
        metric_b,
        coefficient,
        strength,
        sample_size,
        insight: insight_text(metric_a, metric_b, coefficient, sample_size),
    }
}

fn insight_text(a: MetricKind, b: MetricKind, r: Option<f64>, days: usize) -> String {
    let Some(r) = r else {
        return format!(
            "Could not determine a relationship between {} and {}.",
            a.label(),
            b.label()
        );
    };

    let strength = interpret(Some(r));
    if strength == CorrelationStrength::VeryWeak {
        return format!(
            "There is little to no relationship between your {} and {} (r = {:.2} over {} days).",
            a.label(),
            b.label(),
            r,
            days
        );
    }

    let (direction, tendency) = if r > 0.0 {
        ("positively", "higher")
    } else {
        ("negatively", "lower")
    };

    format!(
        "Your {} and {} are {} {} correlated (r = {:.2} over {} days): days with more {} tend to come with {} {}.",
        a.label(),
        b.label(),
        strength.adverb(),
        direction,
        r,
        days,
        a.label(),
        tendency,
        b.label()
    )
}

impl WellnessAnalytics {
    /// Correlate sleep quality with exercise duration over the last `days` days
    pub fn analyze_sleep_exercise_correlation(&self, days: u32) -> CorrelationResult {
        self.analyze_pair(MetricKind::Sleep, MetricKind::Exercise, days)
    }

    /// Correlate mood with sleep quality over the last `days` days
    pub fn analyze_mood_sleep_correlation(&self, days: u32) -> CorrelationResult {
        self.analyze_pair(MetricKind::Mood, MetricKind::Sleep, days)
    }

    /// Correlate mood with exercise duration over the last `days` days
    pub fn analyze_mood_exercise_correlation(&self, days: u32) -> CorrelationResult {
        self.analyze_pair(MetricKind::Mood, MetricKind::Exercise, days)
    }

    /// Correlate any two metrics, memoized per metric pair and window
    pub fn analyze_pair(&self, metric_a: MetricKind, metric_b: MetricKind, days: u32) -> CorrelationResult {
        let operation = format!("{}_{}_correlation", metric_a, metric_b);
        let key = cache_key(&operation, &days);

        self.memoize(&key, || {
            let series_a = self.daily(metric_a, days);
            let series_b = self.daily(metric_b, days);
            let result = correlate_daily(
                metric_a,
                &series_a,
                metric_b,
                &series_b,
                self.config().min_overlap_days,
            );

            tracing::debug!(
                metric_a = %metric_a,
                metric_b = %metric_b,
                days,
                r = ?result.coefficient,
                sample_size = result.sample_size,
                "Calculated correlation"
            );

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::DateKey;

    fn daily(values: &[f64]) -> DailySeries {
        let start = DateKey::new(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start.days_before(-(i as i64)), v))
            .collect()
    }

    #[test]
    fn test_correlate_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 7.0).collect();
        let r = correlate(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlate_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| -0.5 * v + 2.0).collect();
        let r = correlate(&x, &y).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlate_no_correlation() {
        // Alternating pattern has near-zero correlation with linear
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let r = correlate(&x, &y).unwrap();
        assert!(r.abs() < 0.5, "Expected low correlation, got {}", r);
    }

    #[test]
    fn test_correlate_absent_for_bad_shapes() {
        assert_eq!(correlate(&[], &[]), None);
        assert_eq!(correlate(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_correlate_constant_series_is_zero() {
        assert_eq!(correlate(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), Some(0.0));
    }

    #[test]
    fn test_correlate_inexact_constant_series_is_zero() {
        let x = [0.1; 10];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(correlate(&x, &y), Some(0.0));
        assert_eq!(correlate(&y, &x), Some(0.0));
    }

    #[test]
    fn test_correlate_non_finite_input_is_absent() {
        let x = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert_eq!(correlate(&x, &y), None);
        assert_eq!(interpret(correlate(&x, &y)), CorrelationStrength::Unknown);

        // Sums overflow to infinity
        let huge = [1e308, -1e308, 1e308, -1e308, 1e308];
        assert_eq!(correlate(&huge, &y), None);
    }

    #[test]
    fn test_interpret() {
        assert_eq!(interpret(Some(0.75)), CorrelationStrength::Strong);
        assert_eq!(interpret(Some(-0.7)), CorrelationStrength::Strong);
        assert_eq!(interpret(Some(0.45)), CorrelationStrength::Moderate);
        assert_eq!(interpret(Some(-0.4)), CorrelationStrength::Moderate);
        assert_eq!(interpret(Some(0.25)), CorrelationStrength::Weak);
        assert_eq!(interpret(Some(0.1)), CorrelationStrength::VeryWeak);
        assert_eq!(interpret(None), CorrelationStrength::Unknown);
        assert_eq!(interpret(Some(0.1)).to_string(), "Very Weak");
    }

    #[test]
    fn test_correlate_daily_requires_overlap() {
        let a = daily(&[5.0, 6.0, 7.0, 8.0]);
        let b = daily(&[1.0, 2.0, 3.0, 4.0]);

        let result = correlate_daily(MetricKind::Mood, &a, MetricKind::Sleep, &b, MIN_OVERLAP_DAYS);

        assert_eq!(result.coefficient, None);
        assert_eq!(result.strength, CorrelationStrength::Unknown);
        assert_eq!(result.sample_size, 4);
        assert!(result.insight.contains("at least 5 days"));
    }

    #[test]
    fn test_correlate_daily_narrative() {
        let a = daily(&[5.0, 6.0, 7.0, 8.0, 9.0]);
        let b = daily(&[10.0, 8.0, 6.0, 4.0, 2.0]);

        let result = correlate_daily(MetricKind::Mood, &a, MetricKind::Exercise, &b, MIN_OVERLAP_DAYS);

        assert_eq!(result.strength, CorrelationStrength::Strong);
        assert_eq!(result.sample_size, 5);
        assert!(result.insight.contains("strongly negatively correlated"));
        assert!(result.is_notable(0.4));
    }

    #[test]
    fn test_result_serializes_labels() {
        let result = CorrelationResult {
            metric_a: MetricKind::Mood,
            metric_b: MetricKind::Sleep,
            coefficient: Some(0.1),
            strength: CorrelationStrength::VeryWeak,
            sample_size: 30,
            insight: String::new(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"strength\":\"Very Weak\""));
        assert!(json.contains("\"metric_b\":\"sleep\""));
    }
}
