//! Catalogue of "nice" axis steps
//!
//! Steps are a power of the base divided by a small divisor. Numeric axes
//! use base 10 (steps like 1, 0.5, 0.25, 0.2); duration axes use base 60 so
//! steps land on whole minutes and hours (1h, 30min, 20min, 15min, 10min...).

/// Fewest grid lines an axis may have
pub const MIN_LINES: u32 = 6;
/// Most grid lines an axis may have
pub const MAX_LINES: u32 = 12;
/// Acceptance levels for the share of the axis covered by data, tried in order
pub const RANGE_USED_THRESHOLDS: [f64; 4] = [0.849, 0.79, 0.749, 0.7];

/// One family of candidate steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalCatalogue {
    pub base: f64,
    pub divisors: &'static [u32],
    pub preferred: &'static [u32],
}

pub const NUMERIC: IntervalCatalogue = IntervalCatalogue {
    base: 10.0,
    divisors: &[1, 2, 3, 4, 5, 8],
    preferred: &[1, 2, 4, 5],
};

pub const DURATION: IntervalCatalogue = IntervalCatalogue {
    base: 60.0,
    divisors: &[1, 2, 3, 4, 6, 12, 24, 30],
    preferred: &[1, 2, 3, 4, 6, 12, 24],
};

/// A candidate step before it is fitted to the data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCandidate {
    pub step: f64,
    pub preferred: bool,
    /// The power of the base the step was divided from
    pub power: f64,
}

impl IntervalCatalogue {
    pub fn for_data(is_duration: bool) -> &'static IntervalCatalogue {
        if is_duration {
            &DURATION
        } else {
            &NUMERIC
        }
    }

    /// All steps around the magnitude of `range`
    ///
    /// A range of 60 is treated like 600 or 6, scaled by a power of the base.
    pub fn candidates(&self, range: f64) -> Vec<StepCandidate> {
        let exponent = range.log(self.base).round_ties_even();
        let normed = self.base.powf(exponent);

        let mut steps = Vec::with_capacity(self.divisors.len() * 3);
        for &divisor in self.divisors {
            for offset in -1..=1 {
                let power = normed * self.base.powi(offset);
                steps.push(StepCandidate {
                    step: power / divisor as f64,
                    preferred: self.preferred.contains(&divisor),
                    power,
                });
            }
        }
        steps
    }
}
