//! Histogram Binner
//!
//! Time histograms fold a sample onto a repeating cycle (an hour, a week, a
//! year...) and report what share of the total falls in each part of it.

pub mod binner;
pub mod window;

pub use binner::{get_histogram_bins_for_sample, get_largest_bin, HistogramBins, CONTINUOUS_KEY};
pub use window::TimeHistogramWindow;
