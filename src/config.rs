//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis and result-cache tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsConfig {
    /// Results held before least-recently-used eviction
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Result lifetime; 0 or less disables caching
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_ms: i64,

    /// Overlapping days required before a correlation is reported
    #[serde(default = "default_min_overlap_days")]
    pub min_overlap_days: usize,

    /// |Z| above which a day is flagged
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,

    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: usize,

    /// Days forecast by the trend predictor
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: usize,

    /// |r| at which a correlation becomes a report insight
    #[serde(default = "default_insight_threshold")]
    pub insight_threshold: f64,
}

fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

fn default_cache_ttl() -> i64 {
    crate::cache::DEFAULT_TTL_MS
}

fn default_min_overlap_days() -> usize {
    crate::analytics::correlation::MIN_OVERLAP_DAYS
}

fn default_anomaly_threshold() -> f64 {
    crate::analytics::anomaly::DEFAULT_THRESHOLD
}

fn default_moving_average_window() -> usize {
    7
}

fn default_forecast_horizon() -> usize {
    7
}

fn default_insight_threshold() -> f64 {
    0.4
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            cache_ttl_ms: default_cache_ttl(),
            min_overlap_days: default_min_overlap_days(),
            anomaly_threshold: default_anomaly_threshold(),
            moving_average_window: default_moving_average_window(),
            forecast_horizon: default_forecast_horizon(),
            insight_threshold: default_insight_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("wellness-analytics").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Analytics overrides
        if let Some(capacity) = env_parse("WELLNESS_CACHE_CAPACITY") {
            self.analytics.cache_capacity = capacity;
        }
        if let Some(ttl) = env_parse("WELLNESS_CACHE_TTL_MS") {
            self.analytics.cache_ttl_ms = ttl;
        }
        if let Some(threshold) = env_parse("WELLNESS_ANOMALY_THRESHOLD") {
            self.analytics.anomaly_threshold = threshold;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WELLNESS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WELLNESS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Read and parse an environment variable, ignoring unparsable values
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Wellness Analytics Configuration
#
# Environment variables override these settings:
# - WELLNESS_CACHE_CAPACITY
# - WELLNESS_CACHE_TTL_MS
# - WELLNESS_ANOMALY_THRESHOLD
# - WELLNESS_LOG_LEVEL
# - WELLNESS_LOG_FORMAT

[analytics]
# Number of analysis results kept in the cache
cache_capacity = 50

# How long a cached result stays valid (ms); 0 disables caching
cache_ttl_ms = 600000

# Days with data from both metrics needed before a correlation is reported
min_overlap_days = 5

# Z-score above which a day is flagged as unusual
anomaly_threshold = 2.5

# Window for the wellness moving average (days)
moving_average_window = 7

# Days to forecast from the wellness trend
forecast_horizon = 7

# Correlation strength (|r|) at which a finding becomes an insight
insight_threshold = 0.4

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
