//! Axis scale solver
//!
//! Searches the step catalogue for bounds that enclose the data on round
//! numbers while wasting as little of the axis as possible.
//!
//! # Selection
//!
//! 1. Every catalogue step is fitted to the data (bounds snapped to multiples
//!    of the step) and kept if it yields 6..=12 grid lines.
//! 2. For each threshold in [`RANGE_USED_THRESHOLDS`], the largest preferred
//!    step using at least that share of the axis wins, then the largest
//!    non-preferred one.
//! 3. Otherwise the fit using the most of the axis wins (fewer intervals on
//!    ties).

use crate::axis::catalogue::{
    IntervalCatalogue, StepCandidate, MAX_LINES, MIN_LINES, RANGE_USED_THRESHOLDS,
};
use crate::axis::error::{AxisError, AxisResult};
use serde::{Deserialize, Serialize};

/// Interval count used when no catalogue step fits
pub const FALLBACK_INTERVALS: u32 = 10;

const FIXED_BOUNDS_TOLERANCE: f64 = 1e-9;

/// Bounds and subdivision of a y axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YAxisParameters {
    pub bounds_min: f64,
    pub bounds_max: f64,
    /// Number of intervals between `bounds_min` and `bounds_max`
    pub n_intervals: u32,
}

impl YAxisParameters {
    /// Distance between two grid lines
    pub fn interval(&self) -> f64 {
        (self.bounds_max - self.bounds_min) / self.n_intervals.max(1) as f64
    }

    pub fn n_lines(&self) -> u32 {
        self.n_intervals + 1
    }

    /// Value at every grid line, bottom to top
    pub fn tick_values(&self) -> Vec<f64> {
        let interval = self.interval();
        (0..self.n_lines())
            .map(|i| self.bounds_min + interval * i as f64)
            .collect()
    }

    /// Share of the axis covered by `[min, max]`
    pub fn range_used(&self, min: f64, max: f64) -> f64 {
        (max - min) / (self.bounds_max - self.bounds_min)
    }
}

/// A step fitted to the data
#[derive(Debug, Clone, Copy)]
struct FittedInterval {
    step: f64,
    preferred: bool,
    n_lines: u32,
    range_used: f64,
    bounds_min: f64,
    bounds_max: f64,
}

impl FittedInterval {
    fn into_parameters(self) -> YAxisParameters {
        YAxisParameters {
            bounds_min: self.bounds_min,
            bounds_max: self.bounds_max,
            n_intervals: self.n_lines - 1,
        }
    }
}

/// Choose axis bounds and an interval count for data in `[data_min, data_max]`
///
/// With `fixed_bounds` the bounds are the data range itself and only the
/// interval count is chosen. When nothing fits, `throw_if_none_found` turns
/// the result into [`AxisError::NoSolution`]; otherwise the raw range split
/// into [`FALLBACK_INTERVALS`] is returned.
///
/// # Example
///
/// ```rust
/// use graphstat::axis::get_y_parameters;
///
/// let axis = get_y_parameters(0.8, 77.4, false, false, true).unwrap();
/// assert_eq!((axis.bounds_min, axis.bounds_max, axis.n_intervals), (0.0, 80.0, 8));
/// ```
pub fn get_y_parameters(
    data_min: f64,
    data_max: f64,
    is_duration_data: bool,
    fixed_bounds: bool,
    throw_if_none_found: bool,
) -> AxisResult<YAxisParameters> {
    if !data_min.is_finite() || !data_max.is_finite() || data_min > data_max {
        return Err(AxisError::InvalidRange {
            min: data_min,
            max: data_max,
        });
    }

    let (y_min, y_max) = widen_degenerate(data_min, data_max, is_duration_data);
    let catalogue = IntervalCatalogue::for_data(is_duration_data);

    let fitted = fit_candidates(catalogue, y_min, y_max, fixed_bounds);
    tracing::trace!(
        "{} of {} axis steps fit [{}, {}]",
        fitted.len(),
        catalogue.divisors.len() * 3,
        y_min,
        y_max
    );

    if let Some(best) = select(&fitted) {
        tracing::debug!(
            "Axis [{}, {}] step {} ({} lines, {:.3} used)",
            best.bounds_min,
            best.bounds_max,
            best.step,
            best.n_lines,
            best.range_used
        );
        return Ok(best.into_parameters());
    }

    if throw_if_none_found {
        return Err(AxisError::NoSolution {
            min: y_min,
            max: y_max,
            reason: "no interval passed the initial filtering".to_string(),
        });
    }

    tracing::warn!("No axis step fits [{}, {}], using raw range", y_min, y_max);
    Ok(YAxisParameters {
        bounds_min: y_min,
        bounds_max: y_max,
        n_intervals: FALLBACK_INTERVALS,
    })
}

/// Give a single value a non-zero span centred on it
fn widen_degenerate(min: f64, max: f64, is_duration_data: bool) -> (f64, f64) {
    if max > min {
        return (min, max);
    }
    let default_span = if is_duration_data { 60.0 } else { 1.0 };
    let span = (min.abs() * 0.1).max(default_span);
    (min - span / 2.0, max + span / 2.0)
}

fn fit_candidates(
    catalogue: &IntervalCatalogue,
    y_min: f64,
    y_max: f64,
    fixed_bounds: bool,
) -> Vec<FittedInterval> {
    let range = y_max - y_min;
    catalogue
        .candidates(range)
        .into_iter()
        .filter(|c| {
            let count = (range / c.step).ceil();
            count >= (MIN_LINES - 1) as f64 && count <= (MAX_LINES + 1) as f64
        })
        .filter_map(|c| {
            if fixed_bounds {
                fit_fixed(c, y_min, y_max)
            } else {
                Some(fit_dynamic(c, y_min, y_max))
            }
        })
        .filter(|f| (MIN_LINES..=MAX_LINES).contains(&f.n_lines))
        .collect()
}

fn fit_dynamic(candidate: StepCandidate, y_min: f64, y_max: f64) -> FittedInterval {
    let step = candidate.step;
    let mut bounds_min = (y_min / step).floor() * step;
    let mut bounds_max = (y_max / step).ceil() * step;

    // Only a divisor of 1 can leave half a power free on both sides
    let half = candidate.power / 2.0;
    if y_min - bounds_min >= half && bounds_max - y_max >= half {
        bounds_min += half;
        bounds_max -= half;
    }

    let bounds_range = bounds_max - bounds_min;
    FittedInterval {
        step,
        preferred: candidate.preferred,
        n_lines: line_count(bounds_range, step),
        range_used: (y_max - y_min) / bounds_range,
        bounds_min,
        bounds_max,
    }
}

fn fit_fixed(candidate: StepCandidate, y_min: f64, y_max: f64) -> Option<FittedInterval> {
    let step = candidate.step;
    let intervals = (y_max - y_min) / step;
    if (intervals - intervals.round()).abs() > FIXED_BOUNDS_TOLERANCE * intervals.max(1.0) {
        return None;
    }
    Some(FittedInterval {
        step,
        preferred: candidate.preferred,
        n_lines: line_count(y_max - y_min, step),
        range_used: 1.0,
        bounds_min: y_min,
        bounds_max: y_max,
    })
}

fn line_count(bounds_range: f64, step: f64) -> u32 {
    let intervals = (bounds_range / step).round_ties_even();
    if intervals.is_finite() && intervals >= 0.0 && intervals < u32::MAX as f64 {
        intervals as u32 + 1
    } else {
        0
    }
}

fn select(fitted: &[FittedInterval]) -> Option<FittedInterval> {
    for threshold in RANGE_USED_THRESHOLDS {
        for preferred in [true, false] {
            let best = fitted
                .iter()
                .filter(|f| f.preferred == preferred && f.range_used >= threshold)
                .max_by(|a, b| a.step.total_cmp(&b.step));
            if let Some(best) = best {
                return Some(*best);
            }
        }
    }

    fitted.iter().copied().max_by(|a, b| {
        a.range_used
            .total_cmp(&b.range_used)
            .then_with(|| b.n_lines.cmp(&a.n_lines))
    })
}

/// Render seconds as `hh:mm:ss`
pub fn format_duration_label(seconds: f64) -> String {
    let total = seconds.round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
