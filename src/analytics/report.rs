//! Report Assembler
//!
//! Combines the three pairwise correlations and the wellness-trend pipeline
//! into a single report, then derives rule-based insight records from the
//! findings. No numeric work happens here beyond calling the analyzers.

use crate::analytics::aligner::DailySeries;
use crate::analytics::anomaly::{detect, Anomaly, AnomalyKind};
use crate::analytics::correlation::CorrelationResult;
use crate::analytics::engine::WellnessAnalytics;
use crate::analytics::stats::{moving_average, MetricSummary};
use crate::analytics::trend::{predict, TrendDirection, TrendResult};
use crate::analytics::types::{DateKey, MetricKind};
use crate::cache::cache_key;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

/// An anomaly tied back to the day it happened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedAnomaly {
    pub date: DateKey,
    #[serde(flatten)]
    pub anomaly: Anomaly,
}

/// Daily wellness score with smoothing, forecast and outliers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellnessTrend {
    /// Days with a score, ascending
    pub days: Vec<DateKey>,
    /// Mean of the day's mood and sleep-quality averages
    pub scores: Vec<f64>,
    pub moving_average: Vec<f64>,
    /// `None` with fewer than two scored days
    pub trend: Option<TrendResult>,
    pub anomalies: Vec<DatedAnomaly>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Correlation,
    Trend,
    Anomaly,
}

/// A narrative finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub title: String,
    pub message: String,
    /// Actionable follow-up, when one applies
    pub recommendation: Option<String>,
}

/// Multi-metric analysis over one day window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellnessReport {
    pub window_days: u32,
    /// When the report was computed (RFC 3339)
    pub generated_at: String,
    pub summaries: BTreeMap<MetricKind, MetricSummary>,
    /// Sleep/exercise, mood/sleep, mood/exercise
    pub correlations: Vec<CorrelationResult>,
    pub wellness: WellnessTrend,
    pub insights: Vec<Insight>,
}

/// Per-day mean of whichever component series have a value that day
pub fn wellness_scores(components: &[&DailySeries]) -> DailySeries {
    let mut by_day: BTreeMap<DateKey, (f64, usize)> = BTreeMap::new();

    for series in components {
        for (&day, &value) in series.iter() {
            let slot = by_day.entry(day).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }

    by_day
        .into_iter()
        .map(|(day, (sum, count))| (day, sum / count as f64))
        .collect()
}

/// Smooth, fit and scan a daily score series
pub fn analyze_scores(
    scores: &DailySeries,
    window: usize,
    horizon: usize,
    threshold: f64,
) -> WellnessTrend {
    let days: Vec<DateKey> = scores.keys().copied().collect();
    let values: Vec<f64> = scores.values().copied().collect();

    let anomalies = detect(&values, threshold)
        .into_iter()
        .map(|anomaly| DatedAnomaly {
            date: days[anomaly.index],
            anomaly,
        })
        .collect();

    WellnessTrend {
        moving_average: moving_average(&values, window),
        trend: predict(&values, horizon),
        anomalies,
        days,
        scores: values,
    }
}

/// Derive insight records from a report's findings.
///
/// Correlations qualify when |r| reaches `threshold`; the wellness trend
/// qualifies when it is improving or declining; anomalies are summarised in
/// one record.
pub fn build_insights(
    correlations: &[CorrelationResult],
    wellness: &WellnessTrend,
    threshold: f64,
) -> Vec<Insight> {
    let mut insights: Vec<Insight> = correlations
        .iter()
        .filter(|c| c.is_notable(threshold))
        .map(correlation_insight)
        .collect();

    if let Some(trend) = &wellness.trend {
        match trend.trend {
            TrendDirection::Improving => insights.push(Insight {
                category: InsightCategory::Trend,
                title: "Wellness improving".to_string(),
                message: format!(
                    "Your overall wellness score is rising by about {:.2} points per day.",
                    trend.slope
                ),
                recommendation: Some("Keep up the routines that got you here.".to_string()),
            }),
            TrendDirection::Declining => insights.push(Insight {
                category: InsightCategory::Trend,
                title: "Wellness declining".to_string(),
                message: format!(
                    "Your overall wellness score is falling by about {:.2} points per day.",
                    trend.slope.abs()
                ),
                recommendation: Some(
                    "Look back at recent changes in sleep and activity.".to_string(),
                ),
            }),
            TrendDirection::Stable => {}
        }
    }

    if !wellness.anomalies.is_empty() {
        let listed: Vec<String> = wellness
            .anomalies
            .iter()
            .map(|a| format!("{} ({})", a.date, a.anomaly.kind))
            .collect();
        let has_low = wellness
            .anomalies
            .iter()
            .any(|a| a.anomaly.kind == AnomalyKind::UnusuallyLow);

        insights.push(Insight {
            category: InsightCategory::Anomaly,
            title: "Unusual days".to_string(),
            message: format!(
                "{} day{} stood out from your usual wellness: {}.",
                listed.len(),
                if listed.len() == 1 { "" } else { "s" },
                listed.join(", ")
            ),
            recommendation: has_low.then(|| {
                "Check what was different on the low days to spot triggers.".to_string()
            }),
        });
    }

    insights
}

fn correlation_insight(result: &CorrelationResult) -> Insight {
    let positive = result.coefficient.map_or(false, |r| r > 0.0);

    let recommendation = match (result.metric_a, result.metric_b, positive) {
        (MetricKind::Sleep, MetricKind::Exercise, true) => {
            Some("Regular exercise may be helping you sleep better.".to_string())
        }
        (MetricKind::Mood, MetricKind::Sleep, true) => {
            Some("Prioritising good sleep could lift your mood.".to_string())
        }
        (MetricKind::Mood, MetricKind::Exercise, true) => {
            Some("Staying active looks like it supports your mood.".to_string())
        }
        _ => None,
    };

    Insight {
        category: InsightCategory::Correlation,
        title: format!(
            "{} {} and {}",
            result.strength,
            result.metric_a.label(),
            result.metric_b.label()
        ),
        message: result.insight.clone(),
        recommendation,
    }
}

impl WellnessAnalytics {
    /// Daily wellness score pipeline over the last `days` days
    pub fn wellness_trend(&self, days: u32) -> WellnessTrend {
        let config = self.config();
        let key = cache_key(
            "wellness_trend",
            &(
                days,
                config.moving_average_window,
                config.forecast_horizon,
                config.anomaly_threshold,
            ),
        );

        self.memoize(&key, || {
            let mood = self.daily(MetricKind::Mood, days);
            let sleep = self.daily(MetricKind::Sleep, days);
            let scores = wellness_scores(&[&mood, &sleep]);

            analyze_scores(
                &scores,
                config.moving_average_window,
                config.forecast_horizon,
                config.anomaly_threshold,
            )
        })
    }

    /// Full report: correlations, wellness trend, summaries and insights
    pub fn generate_report(&self, days: u32) -> WellnessReport {
        let key = cache_key("wellness_report", &days);

        self.memoize(&key, || {
            let correlations = vec![
                self.analyze_sleep_exercise_correlation(days),
                self.analyze_mood_sleep_correlation(days),
                self.analyze_mood_exercise_correlation(days),
            ];
            let wellness = self.wellness_trend(days);

            let summaries = MetricKind::all()
                .iter()
                .filter_map(|&metric| {
                    let values: Vec<f64> = self.daily(metric, days).into_values().collect();
                    MetricSummary::from_values(&values).map(|summary| (metric, summary))
                })
                .collect();

            let insights = build_insights(&correlations, &wellness, self.config().insight_threshold);

            tracing::info!(
                days,
                insights = insights.len(),
                anomalies = wellness.anomalies.len(),
                "Generated wellness report"
            );

            WellnessReport {
                window_days: days,
                generated_at: Utc::now().to_rfc3339(),
                summaries,
                correlations,
                wellness,
                insights,
            }
        })
    }
}
