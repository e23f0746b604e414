//! Data source boundary
//!
//! The sampler never touches storage directly. Anything that can answer
//! ascending range queries for a feature implements [`DataSource`].

use crate::sampling::error::SamplingResult;
use crate::series::{DataPoint, FeatureId};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read access to the stored points of each feature
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Every point of the feature, oldest first
    async fn points_ascending(&self, feature: FeatureId) -> SamplingResult<Vec<DataPoint>>;

    /// Points with `start <= timestamp <= end`, oldest first
    ///
    /// A `start` of `None` means unbounded.
    async fn points_between_ascending(
        &self,
        feature: FeatureId,
        start: Option<DateTime<FixedOffset>>,
        end: DateTime<FixedOffset>,
    ) -> SamplingResult<Vec<DataPoint>>;

    /// The most recent point of the feature
    async fn last_point(&self, feature: FeatureId) -> SamplingResult<Option<DataPoint>>;
}

/// Select the inclusive `[start, end]` slice of an ascending run of points
pub(crate) fn slice_between(
    points: &[DataPoint],
    start: Option<DateTime<FixedOffset>>,
    end: DateTime<FixedOffset>,
) -> &[DataPoint] {
    let from = match start {
        Some(start) => points.partition_point(|p| p.timestamp < start),
        None => 0,
    };
    let to = points.partition_point(|p| p.timestamp <= end);
    if from >= to {
        &[]
    } else {
        &points[from..to]
    }
}

/// Features held in memory as sorted vectors
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    features: RwLock<HashMap<FeatureId, Vec<DataPoint>>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from already grouped points (sorted on insert)
    pub fn from_points(features: HashMap<FeatureId, Vec<DataPoint>>) -> Self {
        let features = features
            .into_iter()
            .map(|(feature, mut points)| {
                points.sort_by_key(|p| p.timestamp);
                (feature, points)
            })
            .collect();
        Self {
            features: RwLock::new(features),
        }
    }

    /// Add one point, keeping the feature sorted
    pub async fn insert(&self, feature: FeatureId, point: DataPoint) {
        let mut features = self.features.write().await;
        let points = features.entry(feature).or_default();
        let at = points.partition_point(|p| p.timestamp <= point.timestamp);
        points.insert(at, point);
    }

    /// Add many points to one feature
    pub async fn extend(&self, feature: FeatureId, new_points: impl IntoIterator<Item = DataPoint>) {
        let mut features = self.features.write().await;
        let points = features.entry(feature).or_default();
        points.extend(new_points);
        points.sort_by_key(|p| p.timestamp);
    }

    /// Known feature ids, ascending
    pub async fn features(&self) -> Vec<FeatureId> {
        let mut ids: Vec<FeatureId> = self.features.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn points_ascending(&self, feature: FeatureId) -> SamplingResult<Vec<DataPoint>> {
        let features = self.features.read().await;
        Ok(features.get(&feature).cloned().unwrap_or_default())
    }

    async fn points_between_ascending(
        &self,
        feature: FeatureId,
        start: Option<DateTime<FixedOffset>>,
        end: DateTime<FixedOffset>,
    ) -> SamplingResult<Vec<DataPoint>> {
        let features = self.features.read().await;
        Ok(features
            .get(&feature)
            .map(|points| slice_between(points, start, end).to_vec())
            .unwrap_or_default())
    }

    async fn last_point(&self, feature: FeatureId) -> SamplingResult<Option<DataPoint>> {
        let features = self.features.read().await;
        Ok(features.get(&feature).and_then(|points| points.last().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
            .unwrap()
            + Duration::hours(hour)
    }

    #[tokio::test]
    async fn test_insert_keeps_order() {
        let source = InMemoryDataSource::new();
        source.insert(1, DataPoint::new(at(3), 3.0)).await;
        source.insert(1, DataPoint::new(at(1), 1.0)).await;
        source.insert(1, DataPoint::new(at(2), 2.0)).await;

        let values: Vec<f64> = source
            .points_ascending(1)
            .await
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(source.last_point(1).await.unwrap().unwrap().value, 3.0);
    }

    #[tokio::test]
    async fn test_range_is_inclusive() {
        let source = InMemoryDataSource::new();
        source
            .extend(7, (0..10).map(|h| DataPoint::new(at(h), h as f64)))
            .await;

        let points = source
            .points_between_ascending(7, Some(at(2)), at(5))
            .await
            .unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0]);

        let unbounded = source.points_between_ascending(7, None, at(1)).await.unwrap();
        assert_eq!(unbounded.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_feature_is_empty() {
        let source = InMemoryDataSource::new();
        assert!(source.points_ascending(42).await.unwrap().is_empty());
        assert!(source.last_point(42).await.unwrap().is_none());
        assert!(source.features().await.is_empty());
    }

    #[test]
    fn test_slice_between_inverted_window() {
        let points: Vec<DataPoint> = (0..3).map(|h| DataPoint::new(at(h), 0.0)).collect();
        assert!(slice_between(&points, Some(at(2)), at(1)).is_empty());
    }
}
