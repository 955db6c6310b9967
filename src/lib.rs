//! # Wellness Analytics
//!
//! Correlation, trend and anomaly analysis over personal wellness time-series
//! (mood, sleep quality, exercise), with a memoizing LRU+TTL result cache.
//!
//! ## Modules
//!
//! - [`analytics`]: Analyzers and the `WellnessAnalytics` entry point
//! - [`cache`]: Generic LRU cache with per-entry time-to-live
//! - [`source`]: Tracker data boundary and the in-memory source
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wellness_analytics::{AnalyticsConfig, DateKey, Entry, InMemorySource, MetricKind, WellnessAnalytics};
//!
//! let today = DateKey::today();
//! let mut source = InMemorySource::new().as_of(today);
//! for i in 0..10 {
//!     let day = today.days_before(i);
//!     source.push(MetricKind::Mood, Entry::new(day, 5.0 + (i % 3) as f64));
//!     source.push(MetricKind::Sleep, Entry::new(day, 6.0 + (i % 3) as f64));
//! }
//!
//! let analytics = WellnessAnalytics::new(Arc::new(source), AnalyticsConfig::default());
//! let result = analytics.analyze_mood_sleep_correlation(30);
//!
//! println!("{} (r = {:?})", result.insight, result.coefficient);
//! ```

pub mod analytics;
pub mod cache;
pub mod config;
pub mod source;

// Re-export top-level types for convenience
pub use analytics::{
    AnalyticsError, AnalyticsResult, Anomaly, AnomalyKind, CorrelationResult,
    CorrelationStrength, DateKey, Entry, Insight, MetricKind, Timestamp, TrendDirection,
    TrendResult, WellnessAnalytics, WellnessReport, WellnessTrend,
};

pub use cache::{cache_key, CacheStats, Clock, ManualClock, MonotonicClock, ResultCache};

pub use config::{AnalyticsConfig, Config, ConfigError, LoggingConfig};

pub use source::{InMemorySource, WellnessSource};
