//! CSV data source
//!
//! Loads `timestamp,feature,value[,label[,note]]` rows into memory.
//! Supports RFC 3339 timestamps (offset preserved) and common naive formats
//! (read as UTC). Bad rows are recorded and skipped.

use crate::sampling::error::SamplingResult;
use crate::sampling::source::{slice_between, DataSource};
use crate::series::{DataPoint, FeatureId};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;

const MAX_REPORTED_ERRORS: usize = 100;

/// Features loaded from a CSV file
#[derive(Debug, Default)]
pub struct CsvDataSource {
    features: HashMap<FeatureId, Vec<DataPoint>>,
    /// Number of rows turned into points
    pub rows_loaded: usize,
    /// Number of rows skipped
    pub rows_failed: usize,
    /// One message per skipped row (truncated)
    pub errors: Vec<String>,
}

/// Parse a timestamp in any of the accepted formats
pub fn parse_timestamp(ts_str: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, fmt) {
            return utc.from_local_datetime(&dt).single();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(ts_str, fmt) {
            return utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single();
        }
    }

    if let Ok(secs) = ts_str.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.fixed_offset());
    }

    None
}

impl CsvDataSource {
    /// Load a CSV file with a header row
    pub fn load(path: &Path) -> SamplingResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        let source = Self::from_reader(reader);
        tracing::info!(
            "Loaded {} rows from {:?} ({} failed)",
            source.rows_loaded,
            path,
            source.rows_failed
        );
        Ok(source)
    }

    /// Load CSV text with a header row
    pub fn from_csv_str(data: &str) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Self {
        let mut source = Self::default();

        for (line_num, result) in reader.records().enumerate() {
            // Header is line 1
            let actual_line = line_num + 2;
            match Self::parse_record(result) {
                Ok((feature, point)) => {
                    source.features.entry(feature).or_default().push(point);
                    source.rows_loaded += 1;
                }
                Err(e) => {
                    source.rows_failed += 1;
                    if source.errors.len() < MAX_REPORTED_ERRORS {
                        source.errors.push(format!("Line {}: {}", actual_line, e));
                    }
                }
            }
        }

        if source.rows_failed > source.errors.len() {
            source.errors.push(format!(
                "... and {} more errors",
                source.rows_failed - source.errors.len()
            ));
        }

        for points in source.features.values_mut() {
            points.sort_by_key(|p| p.timestamp);
        }
        source
    }

    fn parse_record(
        result: Result<csv::StringRecord, csv::Error>,
    ) -> Result<(FeatureId, DataPoint), String> {
        let record = result.map_err(|e| e.to_string())?;

        let ts_str = record.get(0).ok_or("missing timestamp column")?;
        let timestamp =
            parse_timestamp(ts_str).ok_or_else(|| format!("Could not parse timestamp: {}", ts_str))?;

        let feature_str = record.get(1).ok_or("missing feature column")?;
        let feature: FeatureId = feature_str
            .parse()
            .map_err(|_| format!("Invalid feature id: {}", feature_str))?;

        let value_str = record.get(2).ok_or("missing value column")?;
        let value: f64 = value_str
            .parse()
            .map_err(|_| format!("Invalid value: {}", value_str))?;
        if !value.is_finite() {
            return Err(format!("Invalid value: {}", value_str));
        }

        let point = DataPoint::new(timestamp, value)
            .label(record.get(3).unwrap_or_default())
            .note(record.get(4).unwrap_or_default());
        Ok((feature, point))
    }

    /// Feature ids present in the file, ascending
    pub fn features(&self) -> Vec<FeatureId> {
        let mut ids: Vec<FeatureId> = self.features.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl DataSource for CsvDataSource {
    async fn points_ascending(&self, feature: FeatureId) -> SamplingResult<Vec<DataPoint>> {
        Ok(self.features.get(&feature).cloned().unwrap_or_default())
    }

    async fn points_between_ascending(
        &self,
        feature: FeatureId,
        start: Option<DateTime<FixedOffset>>,
        end: DateTime<FixedOffset>,
    ) -> SamplingResult<Vec<DataPoint>> {
        Ok(self
            .features
            .get(&feature)
            .map(|points| slice_between(points, start, end).to_vec())
            .unwrap_or_default())
    }

    async fn last_point(&self, feature: FeatureId) -> SamplingResult<Option<DataPoint>> {
        Ok(self
            .features
            .get(&feature)
            .and_then(|points| points.last().cloned()))
    }
}
