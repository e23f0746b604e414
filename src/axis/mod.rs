//! Axis Scale Solver
//!
//! Picks round-number y axis bounds and a grid line count for a value range.

pub mod catalogue;
pub mod error;
pub mod solver;

pub use catalogue::IntervalCatalogue;
pub use error::{AxisError, AxisResult};
pub use solver::{format_duration_label, get_y_parameters, YAxisParameters, FALLBACK_INTERVALS};
