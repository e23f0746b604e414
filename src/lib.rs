//! # Graphstat
//!
//! Time-series statistics engine for personal tracking data: calendar-aware
//! alignment, windowed sampling, time histograms and nice axis scales.
//!
//! ## Features
//!
//! - **Calendar alignment**: day, week, month, quarter, half-year and year
//!   boundaries with a configurable week start and day boundary offset
//! - **Sampling**: reads just enough history for averaging and plot totals
//! - **Time histograms**: fold a sample onto an hour, day, week, month,
//!   quarter, half-year or year cycle
//! - **Axis scales**: round-number y axis bounds for numeric and duration data
//!
//! ## Modules
//!
//! - [`temporal`]: Temporal amounts and alignment
//! - [`series`]: Data points, samples and sample transforms
//! - [`sampling`]: Data sources and windowed sampling
//! - [`histogram`]: Time histogram binning
//! - [`axis`]: Axis scale solver
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphstat::histogram::*;
//! use graphstat::sampling::*;
//! use graphstat::series::*;
//! use graphstat::temporal::AggregationWindowPreferences;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = CsvDataSource::load("mood.csv".as_ref())?;
//!
//!     // Last 90 days of feature 1
//!     let sample = SampleRequest::new(1)
//!         .sample_duration(chrono::Duration::days(90))
//!         .fetch(&source)
//!         .await?;
//!
//!     let bins = get_histogram_bins_for_sample(
//!         &sample,
//!         TimeHistogramWindow::Week,
//!         &ValueKind::Continuous,
//!         false,
//!         &AggregationWindowPreferences::default(),
//!     );
//!     println!("{:?}", bins);
//!
//!     Ok(())
//! }
//! ```

pub mod axis;
pub mod config;
pub mod histogram;
pub mod sampling;
pub mod series;
pub mod temporal;
