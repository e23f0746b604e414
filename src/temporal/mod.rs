//! Temporal Aligner
//!
//! Calendar-aware arithmetic shared by sampling and histogram binning:
//! - `TemporalAmount`: a fixed `Duration` or a `CalendarPeriod`
//! - `AggregationWindowPreferences`: week start and day boundary offset
//! - `find_beginning_of_temporal` / `find_end_of_temporal`: align instants

pub mod aligner;
pub mod amount;
pub mod error;
pub mod prefs;

pub use aligner::{
    find_beginning_of_temporal, find_end_of_temporal, get_bi_year_for_month_value,
    get_quarter_for_month_value,
};
pub use amount::{CalendarPeriod, TemporalAmount};
pub use error::{TemporalError, TemporalResult};
pub use prefs::{parse_weekday, AggregationWindowPreferences};
