//! Core data types for the graphstat engine
//!
//! This module defines the values every stage of the pipeline reads:
//! - `DataPoint`: A single timestamped measurement
//! - `DataSample`: An ascending run of points for one feature
//! - `ValueKind`: How the values of a feature should be interpreted

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identifier of a tracked feature (a named time series)
pub type FeatureId = u64;

/// A single time-series data point
///
/// Points are immutable once created. The offset of the timestamp is the one
/// the point was tracked in and is used for all wall-clock computations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    /// When the value was tracked
    pub timestamp: DateTime<FixedOffset>,
    /// The measured value
    pub value: f64,
    /// Free-form label
    #[serde(default)]
    pub label: String,
    /// Free-form note
    #[serde(default)]
    pub note: String,
}

impl DataPoint {
    /// Create a new data point with an empty label and note
    pub fn new(timestamp: DateTime<FixedOffset>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            label: String::new(),
            note: String::new(),
        }
    }

    /// Builder method: set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder method: set the note
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// One labelled value of a discrete feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscreteValue {
    pub index: i32,
    pub label: String,
}

impl DiscreteValue {
    pub fn new(index: i32, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

/// How the values of a feature are interpreted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum ValueKind {
    /// Any real number
    #[default]
    Continuous,
    /// Values are indices into a finite labelled set
    Discrete(Vec<DiscreteValue>),
    /// Values are seconds, displayed as hh:mm:ss
    Duration,
}

impl ValueKind {
    /// Discrete value kind built from bare indices with empty labels
    pub fn discrete_indices(indices: impl IntoIterator<Item = i32>) -> Self {
        ValueKind::Discrete(
            indices
                .into_iter()
                .map(|index| DiscreteValue::new(index, ""))
                .collect(),
        )
    }

    pub fn is_duration(&self) -> bool {
        matches!(self, ValueKind::Duration)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Continuous => write!(f, "continuous"),
            ValueKind::Discrete(values) => write!(f, "discrete({})", values.len()),
            ValueKind::Duration => write!(f, "duration"),
        }
    }
}

/// An ascending (by timestamp) sequence of data points
///
/// Callers are responsible for acquiring points in ascending order; the
/// engine never re-sorts a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSample {
    pub points: Vec<DataPoint>,
    #[serde(default)]
    pub value_kind: Option<ValueKind>,
}

impl DataSample {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            value_kind: None,
        }
    }

    /// An empty sample
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder: declare the value kind of this sample
    pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    /// Check the ascending-order invariant
    pub fn is_ascending(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Minimum and maximum value in the sample
    pub fn value_range(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let min = self.points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = self
            .points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

impl From<Vec<DataPoint>> for DataSample {
    fn from(points: Vec<DataPoint>) -> Self {
        Self::new(points)
    }
}

impl<'a> IntoIterator for &'a DataSample {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
