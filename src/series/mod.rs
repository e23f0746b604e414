//! Time-series values and sample transforms

pub mod transform;
pub mod types;

pub use transform::{calculate_duration_accumulated_values, calculate_moving_averages, clip_data_sample};
pub use types::{DataPoint, DataSample, DiscreteValue, FeatureId, ValueKind};
