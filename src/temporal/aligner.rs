//! Temporal alignment
//!
//! Finds the beginning of the calendar-aware period containing an instant.
//! All computation happens on the wall-clock time of the instant's own
//! offset; the result carries that same offset.
//!
//! # Fixed duration tiers
//!
//! ```text
//! d <= 1h      floor to a multiple of d inside the clock hour
//! d <= 1d      start of day
//! d <= 7d      start of week
//! d <= 31d     first of month
//! d <= 92d     first of quarter  (Jan/Apr/Jul/Oct)
//! d <= 183d    first of half     (Jan/Jul)
//! otherwise    first of year
//! ```
//!
//! Month and coarser tiers never land after the week tier, so a longer
//! duration never aligns later than a shorter one.

use crate::temporal::amount::{CalendarPeriod, TemporalAmount};
use crate::temporal::prefs::AggregationWindowPreferences;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CalendarUnit {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

/// Month (1..=12) that starts the quarter containing `month_value`
///
/// Values outside 1..=12 are clamped into range.
pub fn get_quarter_for_month_value(month_value: u32) -> u32 {
    let month = month_value.clamp(1, 12);
    (3 * ((month - 1) / 3)) + 1
}

/// Month (1..=12) that starts the half year containing `month_value`
pub fn get_bi_year_for_month_value(month_value: u32) -> u32 {
    if month_value < 7 {
        1
    } else {
        7
    }
}

/// Find the beginning of the period of `amount` containing `date_time`
///
/// `amount` must be positive (see [`TemporalAmount::validate`]).
///
/// # Example
///
/// ```rust
/// use chrono::DateTime;
/// use graphstat::temporal::*;
///
/// let at = DateTime::parse_from_rfc3339("2020-05-08T15:45:32Z").unwrap();
/// let quarter = TemporalAmount::Period(CalendarPeriod::months(3));
/// let start = find_beginning_of_temporal(at, &quarter, &AggregationWindowPreferences::default());
/// assert_eq!(start.to_rfc3339(), "2020-04-01T00:00:00+00:00");
/// ```
pub fn find_beginning_of_temporal(
    date_time: DateTime<FixedOffset>,
    amount: &TemporalAmount,
    prefs: &AggregationWindowPreferences,
) -> DateTime<FixedOffset> {
    let aligned = beginning_of_local(date_time.naive_local(), amount, prefs);
    attach_offset(aligned, *date_time.offset())
}

/// Find the beginning of the period following the one containing `date_time`
pub fn find_end_of_temporal(
    date_time: DateTime<FixedOffset>,
    amount: &TemporalAmount,
    prefs: &AggregationWindowPreferences,
) -> DateTime<FixedOffset> {
    let local = date_time.naive_local();
    let next = amount.add_to(local).unwrap_or(local);
    attach_offset(beginning_of_local(next, amount, prefs), *date_time.offset())
}

/// Wall-clock variant of [`find_beginning_of_temporal`]
pub(crate) fn beginning_of_local(
    local: NaiveDateTime,
    amount: &TemporalAmount,
    prefs: &AggregationWindowPreferences,
) -> NaiveDateTime {
    match amount {
        TemporalAmount::Duration(d) => beginning_of_duration(local, *d, prefs),
        TemporalAmount::Period(p) => beginning_of_period(local, p, prefs),
    }
}

pub(crate) fn attach_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(utc, offset)
}

fn beginning_of_duration(
    local: NaiveDateTime,
    duration: Duration,
    prefs: &AggregationWindowPreferences,
) -> NaiveDateTime {
    if duration <= Duration::hours(1) {
        return floor_within_hour(local, duration);
    }

    let unit = if duration <= Duration::days(1) {
        CalendarUnit::Day
    } else if duration <= Duration::days(7) {
        CalendarUnit::Week
    } else if duration <= Duration::days(31) {
        CalendarUnit::Month
    } else if duration <= Duration::days(92) {
        CalendarUnit::Quarter
    } else if duration <= Duration::days(183) {
        CalendarUnit::HalfYear
    } else {
        CalendarUnit::Year
    };

    let start = start_of_unit(local, unit, prefs);
    if unit > CalendarUnit::Week {
        start.min(start_of_unit(local, CalendarUnit::Week, prefs))
    } else {
        start
    }
}

fn beginning_of_period(
    local: NaiveDateTime,
    period: &CalendarPeriod,
    prefs: &AggregationWindowPreferences,
) -> NaiveDateTime {
    let unit = if period.fits_within(&CalendarPeriod::days(1)) {
        CalendarUnit::Day
    } else if period.fits_within(&CalendarPeriod::weeks(1)) {
        CalendarUnit::Week
    } else if period.fits_within(&CalendarPeriod::months(1)) {
        CalendarUnit::Month
    } else if period.fits_within(&CalendarPeriod::months(3)) {
        CalendarUnit::Quarter
    } else if period.fits_within(&CalendarPeriod::months(6)) {
        CalendarUnit::HalfYear
    } else {
        CalendarUnit::Year
    };
    start_of_unit(local, unit, prefs)
}

fn floor_within_hour(local: NaiveDateTime, step: Duration) -> NaiveDateTime {
    let hour_start = local
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(local);

    let step_nanos = step.num_nanoseconds().unwrap_or(0);
    if step_nanos <= 0 {
        return hour_start;
    }
    let into_hour = (local - hour_start).num_nanoseconds().unwrap_or(0);
    hour_start + Duration::nanoseconds((into_hour / step_nanos) * step_nanos)
}

/// Days start at local midnight plus the day boundary offset: shift back by
/// the offset, floor on the calendar, shift forward again.
fn start_of_unit(
    local: NaiveDateTime,
    unit: CalendarUnit,
    prefs: &AggregationWindowPreferences,
) -> NaiveDateTime {
    let offset = prefs.day_boundary_offset;
    let day = (local - offset).date();

    let date = match unit {
        CalendarUnit::Day => day,
        CalendarUnit::Week => {
            let current = day.weekday().num_days_from_monday();
            let first = prefs.week_start.num_days_from_monday();
            let back = (7 + current - first) % 7;
            day - Duration::days(back as i64)
        }
        CalendarUnit::Month => day.with_day(1).unwrap_or(day),
        CalendarUnit::Quarter => {
            NaiveDate::from_ymd_opt(day.year(), get_quarter_for_month_value(day.month()), 1)
                .unwrap_or(day)
        }
        CalendarUnit::HalfYear => {
            NaiveDate::from_ymd_opt(day.year(), get_bi_year_for_month_value(day.month()), 1)
                .unwrap_or(day)
        }
        CalendarUnit::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day),
    };

    date.and_time(NaiveTime::MIN) + offset
}
