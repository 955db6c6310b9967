//! Wellness Analytics CLI
//!
//! Runs analyses over exported tracker data and prints the results as JSON:
//! - Full wellness report
//! - Single metric-pair correlation
//! - Wellness trend and forecast
//! - Unusual days

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellness_analytics::config::{generate_default_config, LoggingConfig};
use wellness_analytics::{Config, DateKey, InMemorySource, WellnessAnalytics};

#[derive(Parser)]
#[command(name = "wellness-analytics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Correlations, trends and anomalies in your wellness data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tracker data file (.json or .csv)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis window in days
    #[arg(long, default_value = "30", global = true)]
    pub days: u32,

    /// Last day of the window, YYYY-MM-DD (default: today)
    #[arg(long, global = true)]
    pub as_of: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full report: correlations, wellness trend and insights
    Report,

    /// Correlate one pair of metrics
    Correlate {
        #[arg(value_enum)]
        pair: MetricPair,
    },

    /// Wellness trend, moving average and forecast
    Trend,

    /// Days that stood out from the usual
    Anomalies {
        /// Z-score threshold (default from config)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricPair {
    SleepExercise,
    MoodSleep,
    MoodExercise,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config.logging);

    if let Commands::Anomalies {
        threshold: Some(threshold),
    } = &cli.command
    {
        config.analytics.anomaly_threshold = *threshold;
    }

    let days = cli.days;
    let output = match &cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
        Commands::Report => {
            let analytics = build_analytics(&cli, config)?;
            serde_json::to_string_pretty(&analytics.generate_report(days))?
        }
        Commands::Correlate { pair } => {
            let analytics = build_analytics(&cli, config)?;
            let result = match pair {
                MetricPair::SleepExercise => analytics.analyze_sleep_exercise_correlation(days),
                MetricPair::MoodSleep => analytics.analyze_mood_sleep_correlation(days),
                MetricPair::MoodExercise => analytics.analyze_mood_exercise_correlation(days),
            };
            serde_json::to_string_pretty(&result)?
        }
        Commands::Trend => {
            let analytics = build_analytics(&cli, config)?;
            serde_json::to_string_pretty(&analytics.wellness_trend(days))?
        }
        Commands::Anomalies { .. } => {
            let analytics = build_analytics(&cli, config)?;
            serde_json::to_string_pretty(&analytics.wellness_trend(days).anomalies)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// Load tracker data and wire up the analytics
fn build_analytics(cli: &Cli, config: Config) -> anyhow::Result<WellnessAnalytics> {
    let Some(data) = &cli.data else {
        bail!("--data <FILE> is required for analysis commands");
    };

    let mut source = InMemorySource::from_path(data)
        .with_context(|| format!("Failed to load tracker data from {:?}", data))?;
    if let Some(as_of) = &cli.as_of {
        source = source.as_of(DateKey::parse(as_of)?);
    }

    Ok(WellnessAnalytics::new(Arc::new(source), config.analytics))
}

/// Install the tracing subscriber; logs go to stderr so stdout stays JSON
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
