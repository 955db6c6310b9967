//! Tracker data sources
//!
//! The analytics core reads raw entries through [`WellnessSource`] and never
//! touches files itself. [`InMemorySource`] is the provided implementation;
//! its loaders turn exported tracker data (JSON or CSV) into entries.
//!
//! # Formats
//!
//! JSON, one array per tracker (missing arrays are empty):
//!
//! ```json
//! {
//!   "mood": [{"timestamp": "2024-01-15T08:30:00Z", "value": 7}],
//!   "sleep": [{"timestamp": 1705276800000, "value": 6.5}],
//!   "exercise": [{"timestamp": "2024-01-15", "value": 45}]
//! }
//! ```
//!
//! CSV with a header row: `metric,timestamp,value`.

use crate::analytics::error::AnalyticsResult;
use crate::analytics::types::{DateKey, DateWindow, Entry, MetricKind, Timestamp};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Provider of raw tracker entries
pub trait WellnessSource: Send + Sync {
    /// Entries for `metric` recorded within the last `days` days
    fn entries(&self, metric: MetricKind, days: u32) -> Vec<Entry>;
}

/// Tracker entries held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    entries: HashMap<MetricKind, Vec<Entry>>,
    /// Last day of every window; today (UTC) when unset
    as_of: Option<DateKey>,
}

#[derive(Debug, Default, Deserialize)]
struct SourceDocument {
    #[serde(default)]
    mood: Vec<Entry>,
    #[serde(default)]
    sleep: Vec<Entry>,
    #[serde(default)]
    exercise: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    metric: String,
    timestamp: String,
    value: f64,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: anchor day windows at `as_of` instead of today
    pub fn as_of(mut self, as_of: DateKey) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Builder: add entries for a metric
    pub fn with_entries(mut self, metric: MetricKind, entries: Vec<Entry>) -> Self {
        self.entries.entry(metric).or_default().extend(entries);
        self
    }

    /// Add a single entry
    pub fn push(&mut self, metric: MetricKind, entry: Entry) {
        self.entries.entry(metric).or_default().push(entry);
    }

    /// Total entries across all trackers
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a JSON document of tracker arrays
    pub fn from_json_reader<R: Read>(reader: R) -> AnalyticsResult<Self> {
        let document: SourceDocument = serde_json::from_reader(reader)?;

        Ok(Self::new()
            .with_entries(MetricKind::Mood, document.mood)
            .with_entries(MetricKind::Sleep, document.sleep)
            .with_entries(MetricKind::Exercise, document.exercise))
    }

    /// Load `metric,timestamp,value` rows
    pub fn from_csv_reader<R: Read>(reader: R) -> AnalyticsResult<Self> {
        let mut source = Self::new();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        for row in csv_reader.deserialize() {
            let row: CsvRow = row?;
            let metric: MetricKind = row.metric.parse()?;
            source.push(metric, Entry::new(Timestamp::Text(row.timestamp), row.value));
        }

        Ok(source)
    }

    /// Load from a file, picking the format from its extension (`.csv` or JSON)
    pub fn from_path(path: &Path) -> AnalyticsResult<Self> {
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

        let source = if is_csv {
            Self::from_csv_reader(file)?
        } else {
            Self::from_json_reader(std::io::BufReader::new(file))?
        };

        tracing::info!(path = ?path, entries = source.len(), "Loaded tracker data");
        Ok(source)
    }
}

impl WellnessSource for InMemorySource {
    fn entries(&self, metric: MetricKind, days: u32) -> Vec<Entry> {
        let window = DateWindow::last_days(self.as_of.unwrap_or_else(DateKey::today), days);

        self.entries
            .get(&metric)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| match entry.date_key() {
                        Ok(key) => window.contains(key),
                        Err(e) => {
                            tracing::warn!(metric = %metric, error = %e, "Skipping entry with unreadable timestamp");
                            false
                        }
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
