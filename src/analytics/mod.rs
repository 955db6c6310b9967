//! Wellness Analytics
//!
//! Statistical routines over daily wellness series, fronted by a memoizing
//! result cache.
//!
//! ## Components
//!
//! - **aligner**: calendar-day keys and alignment of independent series
//! - **correlation**: Pearson correlation, strength grading, pair analyses
//! - **trend**: least-squares fit, forecast and direction
//! - **anomaly**: Z-score outlier detection
//! - **report**: multi-metric report with rule-based insights
//!
//! ## Data Flow
//!
//! 1. A caller asks `WellnessAnalytics` for an analysis over a day window
//! 2. The result cache is checked with a key derived from the call
//! 3. On a miss, entries are pulled from the `WellnessSource`, collapsed to
//!    one value per day and aligned on common days
//! 4. The analyzer runs and its result is cached and returned

pub mod aligner;
pub mod anomaly;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;
pub mod trend;
pub mod types;

pub use aligner::{align, daily_series, DailySeries};
pub use anomaly::{detect, Anomaly, AnomalyKind};
pub use correlation::{correlate, interpret, CorrelationResult, CorrelationStrength};
pub use engine::{CachedAnalysis, WellnessAnalytics};
pub use error::{AnalyticsError, AnalyticsResult};
pub use report::{DatedAnomaly, Insight, InsightCategory, WellnessReport, WellnessTrend};
pub use stats::{moving_average, MetricSummary};
pub use trend::{predict, TrendDirection, TrendResult};
pub use types::{Aggregation, DateKey, DateWindow, Entry, MetricKind, Timestamp};
