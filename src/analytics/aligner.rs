//! Series alignment
//!
//! Trackers record independently, so two series only become comparable once
//! they are keyed by calendar day and cut down to the days both have.

use crate::analytics::types::{Aggregation, DateKey, Entry};
use std::collections::BTreeMap;

/// One value per calendar day, ordered by date
pub type DailySeries = BTreeMap<DateKey, f64>;

/// Collapse raw entries into one value per day.
///
/// Entries whose timestamp cannot be read are skipped.
pub fn daily_series(entries: &[Entry], aggregation: Aggregation) -> DailySeries {
    let mut by_day: BTreeMap<DateKey, Vec<f64>> = BTreeMap::new();

    for entry in entries {
        match entry.date_key() {
            Ok(key) => by_day.entry(key).or_default().push(entry.value),
            Err(e) => {
                tracing::warn!(error = %e, value = entry.value, "Skipping entry with unreadable timestamp");
            }
        }
    }

    by_day
        .into_iter()
        .filter_map(|(key, values)| aggregation.aggregate(&values).map(|v| (key, v)))
        .collect()
}

/// Align two daily series on their common days.
///
/// Both outputs follow the same ascending date order, so position `i` in
/// each refers to the same day. Days present in only one series are dropped.
pub fn align(a: &DailySeries, b: &DailySeries) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .filter_map(|(key, &a_val)| b.get(key).map(|&b_val| (a_val, b_val)))
        .unzip()
}

/// Days present in both series, ascending
pub fn common_days(a: &DailySeries, b: &DailySeries) -> Vec<DateKey> {
    a.keys().filter(|key| b.contains_key(key)).copied().collect()
}
