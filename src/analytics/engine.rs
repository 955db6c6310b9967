//! Analytics facade
//!
//! Owns the injected data source and the result cache. The per-analysis
//! entry points live next to their algorithms (`correlation`, `report`).

use crate::analytics::aligner::{daily_series, DailySeries};
use crate::analytics::correlation::CorrelationResult;
use crate::analytics::report::{WellnessReport, WellnessTrend};
use crate::analytics::types::MetricKind;
use crate::cache::{CacheStats, ResultCache};
use crate::config::AnalyticsConfig;
use crate::source::WellnessSource;
use std::sync::Arc;

/// Any analysis result the cache can hold
#[derive(Debug, Clone)]
pub enum CachedAnalysis {
    Correlation(CorrelationResult),
    Trend(WellnessTrend),
    Report(Box<WellnessReport>),
}

/// Conversion between a concrete result and its cache slot
pub(crate) trait Cacheable: Clone {
    fn into_cached(self) -> CachedAnalysis;
    fn from_cached(cached: CachedAnalysis) -> Option<Self>;
}

impl Cacheable for CorrelationResult {
    fn into_cached(self) -> CachedAnalysis {
        CachedAnalysis::Correlation(self)
    }

    fn from_cached(cached: CachedAnalysis) -> Option<Self> {
        match cached {
            CachedAnalysis::Correlation(result) => Some(result),
            _ => None,
        }
    }
}

impl Cacheable for WellnessTrend {
    fn into_cached(self) -> CachedAnalysis {
        CachedAnalysis::Trend(self)
    }

    fn from_cached(cached: CachedAnalysis) -> Option<Self> {
        match cached {
            CachedAnalysis::Trend(trend) => Some(trend),
            _ => None,
        }
    }
}

impl Cacheable for WellnessReport {
    fn into_cached(self) -> CachedAnalysis {
        CachedAnalysis::Report(Box::new(self))
    }

    fn from_cached(cached: CachedAnalysis) -> Option<Self> {
        match cached {
            CachedAnalysis::Report(report) => Some(*report),
            _ => None,
        }
    }
}

/// Entry point for all wellness analyses
pub struct WellnessAnalytics {
    source: Arc<dyn WellnessSource>,
    config: AnalyticsConfig,
    cache: ResultCache<CachedAnalysis>,
}

impl WellnessAnalytics {
    /// Create an analytics instance with a cache sized from `config`
    pub fn new(source: Arc<dyn WellnessSource>, config: AnalyticsConfig) -> Self {
        let cache = ResultCache::new(config.cache_capacity, config.cache_ttl_ms);
        Self::with_cache(source, config, cache)
    }

    /// Create an analytics instance around a prepared cache (e.g. with a
    /// custom clock)
    pub fn with_cache(
        source: Arc<dyn WellnessSource>,
        config: AnalyticsConfig,
        cache: ResultCache<CachedAnalysis>,
    ) -> Self {
        tracing::debug!(
            capacity = cache.capacity(),
            ttl_ms = cache.default_ttl_ms(),
            "Created analytics result cache"
        );

        Self {
            source,
            config,
            cache,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forget every memoized result, e.g. after the trackers changed
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Cleared analytics cache");
    }

    /// Drop memoized results past their TTL
    pub fn clear_expired(&self) -> usize {
        self.cache.clear_expired()
    }

    /// One value per day for `metric` over the last `days` days
    pub(crate) fn daily(&self, metric: MetricKind, days: u32) -> DailySeries {
        let entries = self.source.entries(metric, days);
        daily_series(&entries, metric.daily_aggregation())
    }

    /// Serve `key` from the cache or compute and store it
    pub(crate) fn memoize<T, F>(&self, key: &str, compute: F) -> T
    where
        T: Cacheable,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.cache.get(key).and_then(T::from_cached) {
            tracing::debug!(key, "Serving cached analysis");
            return hit;
        }

        let value = compute();
        self.cache.set(key, value.clone().into_cached());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::types::{DateKey, Entry};
    use crate::cache::ManualClock;
    use crate::source::InMemorySource;

    fn as_of() -> DateKey {
        DateKey::new(2024, 1, 31).unwrap()
    }

    fn source_with_days(days: u32) -> InMemorySource {
        let mut source = InMemorySource::new().as_of(as_of());
        for i in 0..days {
            let day = as_of().days_before(i64::from(i));
            let x = f64::from(i);
            source.push(MetricKind::Mood, Entry::new(day, 5.0 + (x % 4.0)));
            source.push(MetricKind::Sleep, Entry::new(day, 4.0 + (x % 4.0)));
            source.push(MetricKind::Exercise, Entry::new(day, 60.0 - x));
        }
        source
    }

    #[test]
    fn test_correlation_is_memoized_per_window() {
        let analytics =
            WellnessAnalytics::new(Arc::new(source_with_days(10)), AnalyticsConfig::default());

        let first = analytics.analyze_mood_sleep_correlation(30);
        let second = analytics.analyze_mood_sleep_correlation(30);
        assert_eq!(first, second);

        let stats = analytics.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);

        // A different window is a different key
        analytics.analyze_mood_sleep_correlation(7);
        assert_eq!(analytics.cache_stats().entries, 2);
    }

    #[test]
    fn test_cached_result_expires() {
        let clock = Arc::new(ManualClock::new(0));
        let config = AnalyticsConfig::default();
        let cache = ResultCache::with_clock(config.cache_capacity, 1_000, clock.clone());
        let analytics =
            WellnessAnalytics::with_cache(Arc::new(source_with_days(10)), config, cache);

        analytics.analyze_mood_exercise_correlation(30);
        clock.advance(1_001);
        analytics.analyze_mood_exercise_correlation(30);

        let stats = analytics.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_whole_history_window() {
        let analytics =
            WellnessAnalytics::new(Arc::new(source_with_days(10)), AnalyticsConfig::default());

        let result = analytics.analyze_mood_sleep_correlation(u32::MAX);
        assert_eq!(result.sample_size, 10);
        assert_eq!(result, analytics.analyze_mood_sleep_correlation(30));

        let report = analytics.generate_report(u32::MAX);
        assert_eq!(report.window_days, u32::MAX);
    }

    #[test]
    fn test_disabled_cache_still_computes() {
        let config = AnalyticsConfig {
            cache_ttl_ms: 0,
            ..AnalyticsConfig::default()
        };
        let analytics = WellnessAnalytics::new(Arc::new(source_with_days(10)), config);

        let result = analytics.analyze_sleep_exercise_correlation(30);
        assert!(result.coefficient.is_some());
        assert_eq!(analytics.cache_stats().entries, 0);
    }

    #[test]
    fn test_clear_cache() {
        let analytics =
            WellnessAnalytics::new(Arc::new(source_with_days(10)), AnalyticsConfig::default());

        analytics.analyze_mood_sleep_correlation(30);
        analytics.clear_cache();
        assert_eq!(analytics.cache_stats().entries, 0);
    }
}
