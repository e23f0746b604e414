//! Time histogram windows

use crate::temporal::{CalendarPeriod, TemporalAmount};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The cycle a time histogram folds its sample onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHistogramWindow {
    Hour,
    Day,
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
}

impl TimeHistogramWindow {
    pub const ALL: [TimeHistogramWindow; 7] = [
        TimeHistogramWindow::Hour,
        TimeHistogramWindow::Day,
        TimeHistogramWindow::Week,
        TimeHistogramWindow::Month,
        TimeHistogramWindow::ThreeMonths,
        TimeHistogramWindow::SixMonths,
        TimeHistogramWindow::Year,
    ];

    /// Number of buckets per cycle
    pub fn num_bins(&self) -> usize {
        match self {
            TimeHistogramWindow::Hour => 60,
            TimeHistogramWindow::Day => 24,
            TimeHistogramWindow::Week => 7,
            TimeHistogramWindow::Month => 30,
            TimeHistogramWindow::ThreeMonths => 13,
            TimeHistogramWindow::SixMonths => 26,
            TimeHistogramWindow::Year => 12,
        }
    }

    /// Length of one cycle
    pub fn cycle(&self) -> TemporalAmount {
        match self {
            TimeHistogramWindow::Hour => TemporalAmount::Duration(Duration::hours(1)),
            TimeHistogramWindow::Day => TemporalAmount::Period(CalendarPeriod::days(1)),
            TimeHistogramWindow::Week => TemporalAmount::Period(CalendarPeriod::weeks(1)),
            TimeHistogramWindow::Month => TemporalAmount::Period(CalendarPeriod::months(1)),
            TimeHistogramWindow::ThreeMonths => TemporalAmount::Period(CalendarPeriod::months(3)),
            TimeHistogramWindow::SixMonths => TemporalAmount::Period(CalendarPeriod::months(6)),
            TimeHistogramWindow::Year => TemporalAmount::Period(CalendarPeriod::years(1)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeHistogramWindow::Hour => "hour",
            TimeHistogramWindow::Day => "day",
            TimeHistogramWindow::Week => "week",
            TimeHistogramWindow::Month => "month",
            TimeHistogramWindow::ThreeMonths => "three_months",
            TimeHistogramWindow::SixMonths => "six_months",
            TimeHistogramWindow::Year => "year",
        }
    }
}

impl std::fmt::Display for TimeHistogramWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeHistogramWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TimeHistogramWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == normalized)
            .ok_or_else(|| format!("Unknown histogram window: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!("week".parse(), Ok(TimeHistogramWindow::Week));
        assert_eq!("Three-Months".parse(), Ok(TimeHistogramWindow::ThreeMonths));
        assert!("fortnight".parse::<TimeHistogramWindow>().is_err());
    }

    #[test]
    fn test_cycles_are_positive() {
        for window in TimeHistogramWindow::ALL {
            assert!(window.cycle().validate().is_ok());
            assert!(window.num_bins() > 0);
        }
    }
}
