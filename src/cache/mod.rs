//! Result Cache
//!
//! Memoizes expensive, deterministic analyses keyed by their argument tuple.
//!
//! - **ResultCache**: least-recently-used cache with per-entry time-to-live
//! - **Clock**: time source used for expiry (monotonic by default)
//! - **cache_key**: canonical key derivation for analytic calls
//!
//! # Example
//!
//! ```rust
//! use wellness_analytics::cache::{cache_key, ResultCache};
//!
//! let cache: ResultCache<f64> = ResultCache::new(50, 600_000);
//! let key = cache_key("mood_sleep_correlation", &30u32);
//!
//! let r = cache.get_or_insert_with(&key, || 0.42);
//! assert_eq!(cache.get(&key), Some(r));
//! ```

mod clock;
mod result_cache;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use result_cache::{cache_key, CacheStats, ResultCache, DEFAULT_CAPACITY, DEFAULT_TTL_MS};
