//! Histogram binning
//!
//! Folds a sample onto one cycle of a [`TimeHistogramWindow`] and reports
//! the share of the total mass falling in each bucket, per value key.

use crate::histogram::window::TimeHistogramWindow;
use crate::series::{DataPoint, DataSample, ValueKind};
use crate::temporal::aligner::beginning_of_local;
use crate::temporal::AggregationWindowPreferences;
use std::collections::BTreeMap;

/// Bucket sequences keyed by value key
pub type HistogramBins = BTreeMap<i32, Vec<f64>>;

/// Key used for continuous and duration values
pub const CONTINUOUS_KEY: i32 = 0;

/// Bucket every point of `sample` by its position within its cycle
///
/// Continuous and duration samples produce the single key `0`; discrete
/// samples produce one key per declared value, all present even when empty.
/// Each bucket holds its share of the grand total across every key, so all
/// buckets together sum to 1 (or are all 0 when there is no mass).
///
/// Returns `None` for an empty sample.
pub fn get_histogram_bins_for_sample(
    sample: &DataSample,
    window: TimeHistogramWindow,
    value_kind: &ValueKind,
    sum_by_count: bool,
    prefs: &AggregationWindowPreferences,
) -> Option<HistogramBins> {
    if sample.is_empty() {
        return None;
    }

    let n_bins = window.num_bins();
    let mut bins: HistogramBins = match value_kind {
        ValueKind::Discrete(values) => values.iter().map(|v| (v.index, vec![0.0; n_bins])).collect(),
        ValueKind::Continuous | ValueKind::Duration => {
            BTreeMap::from([(CONTINUOUS_KEY, vec![0.0; n_bins])])
        }
    };
    let is_discrete = matches!(value_kind, ValueKind::Discrete(_));

    let mut skipped = 0usize;
    for point in sample {
        let key = if is_discrete {
            point.value as i32
        } else {
            CONTINUOUS_KEY
        };
        let (Some(bucket), Some(index)) = (bins.get_mut(&key), bin_index(point, window, prefs))
        else {
            skipped += 1;
            continue;
        };
        bucket[index] += if sum_by_count { 1.0 } else { point.value };
    }

    let total: f64 = bins.values().flat_map(|b| b.iter()).sum();
    for bucket in bins.values_mut() {
        for v in bucket.iter_mut() {
            *v = if total == 0.0 { 0.0 } else { *v / total };
        }
    }

    tracing::debug!(
        "Binned {} points into {} x {} buckets ({} skipped)",
        sample.len() - skipped,
        bins.len(),
        n_bins,
        skipped
    );
    Some(bins)
}

/// Position of `point` within its cycle, in `0..window.num_bins()`
fn bin_index(
    point: &DataPoint,
    window: TimeHistogramWindow,
    prefs: &AggregationWindowPreferences,
) -> Option<usize> {
    let cycle = window.cycle();
    let local = point.timestamp.naive_local();
    let start = beginning_of_local(local, &cycle, prefs);
    let end = cycle.add_to(start)?;

    let cycle_secs = (end - start).num_seconds();
    if cycle_secs <= 0 {
        return None;
    }
    let into_cycle = (local - start).num_seconds().clamp(0, cycle_secs);

    let n_bins = window.num_bins();
    let index = ((n_bins as f64) * (into_cycle as f64) / (cycle_secs as f64)) as usize;
    Some(index.min(n_bins - 1))
}

/// Height of the tallest stacked bar: the largest per-position sum across keys
pub fn get_largest_bin(bins: &HistogramBins) -> Option<f64> {
    let n_bins = bins.values().map(Vec::len).max()?;
    (0..n_bins)
        .map(|i| bins.values().filter_map(|b| b.get(i)).sum::<f64>())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
}
