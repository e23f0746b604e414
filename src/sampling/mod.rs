//! Sampler
//!
//! This module provides bounded reads of a feature's history:
//! - `DataSource`: the storage boundary (in-memory and CSV backed)
//! - `SampleRequest` / `sample_data`: resolve the lookback window and fetch

pub mod csv_source;
pub mod error;
pub mod sampler;
pub mod source;

pub use csv_source::CsvDataSource;
pub use error::{SamplingError, SamplingResult};
pub use sampler::{sample_data, SampleRequest, SampleWindow};
pub use source::{DataSource, InMemoryDataSource};
