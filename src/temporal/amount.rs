//! Temporal amounts: fixed durations and calendar periods
//!
//! A `TemporalAmount` is either an exact `chrono::Duration` or a
//! `CalendarPeriod` made of whole years, months and days whose exact length
//! depends on where on the calendar it is applied.

use crate::temporal::error::{TemporalError, TemporalResult};
use chrono::{Duration, Months, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static ISO_AMOUNT: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[Pp](\d+)([DdWwMmYy])$"));

static SHORT_AMOUNT: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*(ms|s|min|m|h|d|w|mo|y)$"));

fn compiled(re: &'static Lazy<Result<Regex, regex::Error>>) -> TemporalResult<&'static Regex> {
    Lazy::force(re)
        .as_ref()
        .map_err(|e| TemporalError::Parse(e.to_string()))
}

/// A calendar period of whole years, months and days
///
/// Comparison between periods is field-wise, most significant field first,
/// so `1 month + 1 day` is longer than `1 month` and `8 days` is shorter
/// than `1 month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CalendarPeriod {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl CalendarPeriod {
    pub const fn new(years: i32, months: i32, days: i32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub const fn days(days: i32) -> Self {
        Self::new(0, 0, days)
    }

    /// Overflows for more than `i32::MAX / 7` weeks; parsed input goes
    /// through [`CalendarPeriod::checked_weeks`]
    pub const fn weeks(weeks: i32) -> Self {
        Self::new(0, 0, weeks * 7)
    }

    /// Like [`CalendarPeriod::weeks`], `None` when the day count overflows
    pub const fn checked_weeks(weeks: i32) -> Option<Self> {
        match weeks.checked_mul(7) {
            Some(days) => Some(Self::days(days)),
            None => None,
        }
    }

    pub const fn months(months: i32) -> Self {
        Self::new(0, months, 0)
    }

    pub const fn years(years: i32) -> Self {
        Self::new(years, 0, 0)
    }

    /// Builder: add days to this period
    pub const fn plus_days(self, days: i32) -> Self {
        Self::new(self.years, self.months, self.days + days)
    }

    fn minus(&self, other: &CalendarPeriod) -> CalendarPeriod {
        CalendarPeriod::new(
            self.years - other.years,
            self.months - other.months,
            self.days - other.days,
        )
    }

    /// Zero or negative, judged by the most significant non-zero field
    pub fn is_negative_or_zero(&self) -> bool {
        self.years < 0
            || (self.years == 0 && self.months < 0)
            || (self.years == 0 && self.months == 0 && self.days <= 0)
    }

    /// Whether this period is no longer than `other`
    pub fn fits_within(&self, other: &CalendarPeriod) -> bool {
        self.minus(other).is_negative_or_zero()
    }

    fn total_months(&self) -> i64 {
        self.years as i64 * 12 + self.months as i64
    }

    /// Apply this period to a wall-clock time (months first, then days)
    pub fn add_to(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.total_months();
        let shifted = if months >= 0 {
            dt.checked_add_months(Months::new(u32::try_from(months).ok()?))?
        } else {
            dt.checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
        };
        shifted.checked_add_signed(Duration::days(self.days as i64))
    }

    /// Apply the negation of this period to a wall-clock time
    pub fn subtract_from(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        CalendarPeriod::new(-self.years, -self.months, -self.days).add_to(dt)
    }
}

impl std::fmt::Display for CalendarPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 || (self.years == 0 && self.months == 0) {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

/// Either an exact duration or a calendar period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalAmount {
    Duration(Duration),
    Period(CalendarPeriod),
}

impl TemporalAmount {
    /// Reject zero and negative amounts
    pub fn validate(&self) -> TemporalResult<()> {
        let non_positive = match self {
            TemporalAmount::Duration(d) => *d <= Duration::zero(),
            TemporalAmount::Period(p) => p.is_negative_or_zero(),
        };
        if non_positive {
            Err(TemporalError::NonPositiveAmount(self.to_string()))
        } else {
            Ok(())
        }
    }

    /// Add this amount to a wall-clock time
    pub fn add_to(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TemporalAmount::Duration(d) => dt.checked_add_signed(*d),
            TemporalAmount::Period(p) => p.add_to(dt),
        }
    }

    /// Subtract this amount from a wall-clock time
    pub fn subtract_from(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TemporalAmount::Duration(d) => dt.checked_sub_signed(*d),
            TemporalAmount::Period(p) => p.subtract_from(dt),
        }
    }

    /// Exact span covered when this amount is added at `dt`
    pub fn span_from(&self, dt: NaiveDateTime) -> Option<Duration> {
        match self {
            TemporalAmount::Duration(d) => Some(*d),
            TemporalAmount::Period(p) => p.add_to(dt).map(|end| end - dt),
        }
    }
}

impl From<Duration> for TemporalAmount {
    fn from(d: Duration) -> Self {
        TemporalAmount::Duration(d)
    }
}

impl From<CalendarPeriod> for TemporalAmount {
    fn from(p: CalendarPeriod) -> Self {
        TemporalAmount::Period(p)
    }
}

impl std::fmt::Display for TemporalAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemporalAmount::Duration(d) => match d.num_nanoseconds() {
                Some(n) if n % 1_000_000_000 != 0 => write!(f, "{}ns", n),
                _ => write!(f, "{}s", d.num_seconds()),
            },
            TemporalAmount::Period(p) => write!(f, "{}", p),
        }
    }
}

/// Parse amounts like `90m`, `1h`, `10d`, `2w` (fixed durations) or
/// `3mo`, `1y`, `P1D`, `P1W`, `P3M`, `P1Y` (calendar periods)
impl FromStr for TemporalAmount {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse_error = || TemporalError::Parse(s.to_string());

        if let Some(caps) = compiled(&ISO_AMOUNT)?.captures(trimmed) {
            let n: i32 = caps[1].parse().map_err(|_| parse_error())?;
            let period = match caps[2].to_ascii_uppercase().as_str() {
                "D" => CalendarPeriod::days(n),
                "W" => CalendarPeriod::checked_weeks(n).ok_or_else(parse_error)?,
                "M" => CalendarPeriod::months(n),
                _ => CalendarPeriod::years(n),
            };
            return Ok(TemporalAmount::Period(period));
        }

        let caps = compiled(&SHORT_AMOUNT)?
            .captures(trimmed)
            .ok_or_else(parse_error)?;
        let n: i64 = caps[1].parse().map_err(|_| parse_error())?;

        let duration = match &caps[2] {
            "ms" => Some(Duration::milliseconds(n)),
            "s" => Duration::try_seconds(n),
            "m" | "min" => Duration::try_minutes(n),
            "h" => Duration::try_hours(n),
            "d" => Duration::try_days(n),
            "w" => Duration::try_weeks(n),
            unit => {
                let n = i32::try_from(n).map_err(|_| parse_error())?;
                let period = if unit == "mo" {
                    CalendarPeriod::months(n)
                } else {
                    CalendarPeriod::years(n)
                };
                return Ok(TemporalAmount::Period(period));
            }
        };
        Ok(TemporalAmount::Duration(duration.ok_or_else(parse_error)?))
    }
}
