//! Graphstat CLI
//!
//! Command-line driver for the graphstat engine:
//! - Align an instant to its calendar period
//! - Sample a CSV feature and fold it into a time histogram
//! - Solve a nice y axis for a value range
//! - Print the default configuration

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use graphstat::axis::{format_duration_label, get_y_parameters};
use graphstat::config::{generate_default_config, Config};
use graphstat::histogram::{get_histogram_bins_for_sample, get_largest_bin, TimeHistogramWindow};
use graphstat::sampling::{CsvDataSource, SampleRequest};
use graphstat::series::{FeatureId, ValueKind};
use graphstat::temporal::{find_beginning_of_temporal, find_end_of_temporal, TemporalAmount};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "graphstat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Time-series statistics for personal tracking data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the period containing an instant
    Align {
        /// Instant (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
        /// Period length (e.g. 15m, 1h, 10d, P1W, 3mo, 1y)
        #[arg(short, long)]
        amount: String,
    },

    /// Fold a feature from a CSV file into a time histogram
    Histogram {
        /// CSV file with timestamp,feature,value[,label[,note]] rows
        #[arg(long)]
        file: PathBuf,
        /// Feature id
        #[arg(long)]
        feature: FeatureId,
        /// Window (hour, day, week, month, three_months, six_months, year)
        #[arg(short, long, default_value = "week")]
        window: TimeHistogramWindow,
        /// Count points instead of summing values
        #[arg(long)]
        count: bool,
        /// Treat values as discrete indices (comma-separated)
        #[arg(long, value_delimiter = ',')]
        discrete: Vec<i32>,
        /// Only use this much history (e.g. 30d, 3mo)
        #[arg(short, long)]
        last: Option<String>,
        /// End of the sampled history (RFC 3339)
        #[arg(long)]
        end: Option<String>,
    },

    /// Solve a y axis for a value range
    Axis {
        /// Smallest data value
        #[arg(long, allow_negative_numbers = true)]
        min: f64,
        /// Largest data value
        #[arg(long, allow_negative_numbers = true)]
        max: f64,
        /// Values are durations in seconds
        #[arg(long)]
        duration: bool,
        /// Keep min/max as the bounds and only choose the intervals
        #[arg(long)]
        fixed: bool,
        /// Fail when no nice axis fits
        #[arg(long)]
        strict: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(config: &Config) {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("graphstat={}", config.logging.level));
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn parse_instant(s: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).with_context(|| format!("Invalid timestamp: {}", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;
    init_logging(&config);
    let prefs = config.preferences()?;
    let json = match cli.format.as_str() {
        "json" => true,
        "table" => false,
        other => bail!("Unknown output format: {}", other),
    };

    match cli.command {
        Commands::Align { at, amount } => {
            let at = match at.as_deref() {
                Some(s) => parse_instant(s)?,
                None => Local::now().fixed_offset(),
            };
            let amount: TemporalAmount = amount.parse()?;
            amount.validate()?;

            let start = find_beginning_of_temporal(at, &amount, &prefs);
            let end = find_end_of_temporal(at, &amount, &prefs);

            if json {
                let body = serde_json::json!({
                    "at": at.to_rfc3339(),
                    "amount": amount.to_string(),
                    "start": start.to_rfc3339(),
                    "end": end.to_rfc3339(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{:<8} {}", "At", at.to_rfc3339());
                println!("{:<8} {}", "Amount", amount);
                println!("{:<8} {}", "Start", start.to_rfc3339());
                println!("{:<8} {}", "End", end.to_rfc3339());
            }
        }

        Commands::Histogram {
            file,
            feature,
            window,
            count,
            discrete,
            last,
            end,
        } => {
            if !file.exists() {
                bail!("File not found: {:?}", file);
            }
            let source = CsvDataSource::load(&file)?;
            for error in &source.errors {
                tracing::warn!("{}", error);
            }

            let mut request = SampleRequest::new(feature);
            let end = end.as_deref().map(parse_instant).transpose()?;
            if let Some(end) = end {
                request = request.end_date(end);
            }
            if let Some(last) = last {
                let amount: TemporalAmount = last.parse()?;
                amount.validate()?;
                let reference = end.unwrap_or_else(|| Local::now().fixed_offset());
                let lookback = match amount {
                    TemporalAmount::Duration(d) => d,
                    TemporalAmount::Period(p) => {
                        let to = reference.naive_local();
                        let from = p
                            .subtract_from(to)
                            .with_context(|| format!("History {} is out of range", p))?;
                        to - from
                    }
                };
                request = request.sample_duration(lookback);
            }
            let sample = request.fetch(&source).await?;

            let kind = if discrete.is_empty() {
                ValueKind::Continuous
            } else {
                ValueKind::discrete_indices(discrete)
            };

            let Some(bins) = get_histogram_bins_for_sample(&sample, window, &kind, count, &prefs)
            else {
                println!("No data for feature {} in {:?}", feature, file);
                return Ok(());
            };

            if json {
                let body = serde_json::json!({
                    "feature": feature,
                    "window": window,
                    "points": sample.len(),
                    "largest_bin": get_largest_bin(&bins),
                    "bins": bins,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "Feature {} | {} window | {} points",
                    feature,
                    window,
                    sample.len()
                );
                print!("{:<6}", "Bin");
                for key in bins.keys() {
                    print!(" {:>10}", format!("key {}", key));
                }
                println!();
                println!("{}", "-".repeat(6 + 11 * bins.len()));
                for i in 0..window.num_bins() {
                    print!("{:<6}", i);
                    for values in bins.values() {
                        print!(" {:>9.2}%", values[i] * 100.0);
                    }
                    println!();
                }
            }
        }

        Commands::Axis {
            min,
            max,
            duration,
            fixed,
            strict,
        } => {
            let throw = strict || config.axis.throw_if_none_found;
            let axis = get_y_parameters(min, max, duration, fixed, throw)?;

            if json {
                let body = serde_json::json!({
                    "bounds_min": axis.bounds_min,
                    "bounds_max": axis.bounds_max,
                    "n_intervals": axis.n_intervals,
                    "interval": axis.interval(),
                    "ticks": axis.tick_values(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "Bounds [{}, {}] in {} intervals of {}",
                    axis.bounds_min,
                    axis.bounds_max,
                    axis.n_intervals,
                    axis.interval()
                );
                for tick in axis.tick_values().iter().rev() {
                    if duration {
                        println!("  {}", format_duration_label(*tick));
                    } else {
                        println!("  {}", tick);
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}
