//! Aggregation window preferences
//!
//! Defines what the "start of a day" and "start of a week" mean for every
//! alignment performed by the engine. Constructed once (usually from
//! [`crate::config::Config`]) and passed explicitly to each call.

use crate::temporal::error::{TemporalError, TemporalResult};
use chrono::{Duration, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindowPreferences {
    /// First day of the week
    pub week_start: Weekday,
    /// How long after local midnight a new day begins
    pub day_boundary_offset: Duration,
}

impl Default for AggregationWindowPreferences {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            day_boundary_offset: Duration::zero(),
        }
    }
}

impl AggregationWindowPreferences {
    pub fn new(week_start: Weekday, day_boundary_offset: Duration) -> Self {
        Self {
            week_start,
            day_boundary_offset,
        }
    }

    /// Builder: set the first day of the week
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Builder: set the day boundary offset
    pub fn day_boundary_offset(mut self, offset: Duration) -> Self {
        self.day_boundary_offset = offset;
        self
    }
}

/// Parse a weekday name such as `mon`, `Monday` or `SUN`
pub fn parse_weekday(s: &str) -> TemporalResult<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| TemporalError::InvalidWeekday(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = AggregationWindowPreferences::default();
        assert_eq!(prefs.week_start, Weekday::Mon);
        assert_eq!(prefs.day_boundary_offset, Duration::zero());
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("wed").unwrap(), Weekday::Wed);
        assert_eq!(parse_weekday("Sunday").unwrap(), Weekday::Sun);
        assert!(matches!(
            parse_weekday("someday"),
            Err(TemporalError::InvalidWeekday(_))
        ));
    }
}
