//! Windowed sampling of a feature
//!
//! Works out how far back to read so that moving averages and per-period
//! totals have enough history, then performs a single range fetch.

use crate::sampling::error::{SamplingError, SamplingResult};
use crate::sampling::source::DataSource;
use crate::series::{DataSample, FeatureId};
use crate::temporal::TemporalAmount;
use chrono::{DateTime, Duration, FixedOffset, Local};

/// The inclusive window a sample is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    /// `None` means unbounded
    pub start: Option<DateTime<FixedOffset>>,
    pub end: DateTime<FixedOffset>,
}

/// Parameters of one sampling call
#[derive(Debug, Clone)]
pub struct SampleRequest {
    pub feature: FeatureId,
    pub sample_duration: Option<Duration>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub averaging_duration: Option<Duration>,
    pub plot_total_duration: Option<TemporalAmount>,
    /// Clock override; the system clock is used when `None`
    pub now: Option<DateTime<FixedOffset>>,
}

impl SampleRequest {
    pub fn new(feature: FeatureId) -> Self {
        Self {
            feature,
            sample_duration: None,
            end_date: None,
            averaging_duration: None,
            plot_total_duration: None,
            now: None,
        }
    }

    pub fn sample_duration(mut self, duration: Duration) -> Self {
        self.sample_duration = Some(duration);
        self
    }

    pub fn end_date(mut self, end: DateTime<FixedOffset>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn averaging_duration(mut self, duration: Duration) -> Self {
        self.averaging_duration = Some(duration);
        self
    }

    pub fn plot_total_duration(mut self, amount: TemporalAmount) -> Self {
        self.plot_total_duration = Some(amount);
        self
    }

    pub fn now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = Some(now);
        self
    }

    fn validate(&self) -> SamplingResult<()> {
        let durations = [
            ("sample duration", self.sample_duration),
            ("averaging duration", self.averaging_duration),
        ];
        for (name, duration) in durations {
            if let Some(d) = duration {
                if d <= Duration::zero() {
                    return Err(SamplingError::InvalidArgument(format!(
                        "{} must be positive, got {}s",
                        name,
                        d.num_seconds()
                    )));
                }
            }
        }
        if let Some(amount) = &self.plot_total_duration {
            amount.validate().map_err(|e| {
                SamplingError::InvalidArgument(format!("plot total duration: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the window to read, or `None` for the whole series
    pub async fn window<S: DataSource + ?Sized>(
        &self,
        source: &S,
    ) -> SamplingResult<Option<SampleWindow>> {
        self.validate()?;

        if self.sample_duration.is_none() && self.end_date.is_none() {
            return Ok(None);
        }

        let end = match self.end_date {
            Some(end) => end,
            None => {
                let now = self.now.unwrap_or_else(|| Local::now().fixed_offset());
                let after_last = source
                    .last_point(self.feature)
                    .await?
                    .and_then(|last| last.timestamp.checked_add_signed(Duration::seconds(1)));
                match after_last {
                    Some(after_last) if after_last > now => after_last,
                    _ => now,
                }
            }
        };

        let start = match self.sample_duration {
            Some(sample_duration) => {
                let mut lookback = sample_duration;
                if let Some(avg) = self.averaging_duration {
                    let with_avg = sample_duration
                        .checked_add(&avg)
                        .ok_or_else(|| out_of_range("averaging duration", end))?;
                    lookback = lookback.max(with_avg);
                }
                if let Some(plot) = &self.plot_total_duration {
                    let with_plot = plot
                        .span_from(end.naive_local())
                        .and_then(|span| sample_duration.checked_add(&span))
                        .ok_or_else(|| out_of_range("plot total duration", end))?;
                    lookback = lookback.max(with_plot);
                }
                let start = end
                    .checked_sub_signed(lookback)
                    .ok_or_else(|| out_of_range("sample duration", end))?;
                Some(start)
            }
            None => None,
        };

        Ok(Some(SampleWindow { start, end }))
    }

    /// Read the sample described by this request
    pub async fn fetch<S: DataSource + ?Sized>(&self, source: &S) -> SamplingResult<DataSample> {
        let points = match self.window(source).await? {
            None => {
                tracing::debug!("Sampling feature {} without window", self.feature);
                source.points_ascending(self.feature).await?
            }
            Some(window) => {
                tracing::debug!(
                    "Sampling feature {} from {:?} to {}",
                    self.feature,
                    window.start,
                    window.end
                );
                source
                    .points_between_ascending(self.feature, window.start, window.end)
                    .await?
            }
        };
        tracing::debug!("Sampled {} points for feature {}", points.len(), self.feature);
        Ok(DataSample::new(points))
    }
}

fn out_of_range(name: &str, end: DateTime<FixedOffset>) -> SamplingError {
    SamplingError::InvalidArgument(format!("{} reaches out of range back from {}", name, end))
}

/// Fetch the points of `feature` needed to plot it
///
/// With neither `sample_duration` nor `end_date` the whole series is
/// returned. Otherwise the window ends at `end_date` (or the later of now and
/// just after the last point) and reaches back far enough to cover the
/// averaging and plot total durations too.
pub async fn sample_data<S: DataSource + ?Sized>(
    source: &S,
    feature: FeatureId,
    sample_duration: Option<Duration>,
    end_date: Option<DateTime<FixedOffset>>,
    averaging_duration: Option<Duration>,
    plot_total_duration: Option<TemporalAmount>,
) -> SamplingResult<DataSample> {
    SampleRequest {
        feature,
        sample_duration,
        end_date,
        averaging_duration,
        plot_total_duration,
        now: None,
    }
    .fetch(source)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::source::InMemoryDataSource;
    use crate::series::DataPoint;
    use crate::temporal::CalendarPeriod;
    use chrono::TimeZone;

    fn day(d: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    async fn daily_source(days: i64) -> InMemoryDataSource {
        let source = InMemoryDataSource::new();
        source
            .extend(1, (0..days).map(|d| DataPoint::new(day(d), d as f64)))
            .await;
        source
    }

    #[tokio::test]
    async fn test_no_duration_or_end_returns_everything() {
        let source = daily_source(30).await;
        let request = SampleRequest::new(1).now(day(0));

        assert_eq!(request.window(&source).await.unwrap(), None);
        assert_eq!(request.fetch(&source).await.unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_end_without_duration_is_unbounded_start() {
        let source = daily_source(30).await;
        let window = SampleRequest::new(1)
            .end_date(day(9))
            .window(&source)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(window, SampleWindow { start: None, end: day(9) });

        let sample = SampleRequest::new(1).end_date(day(9)).fetch(&source).await.unwrap();
        assert_eq!(sample.len(), 10);
    }

    #[tokio::test]
    async fn test_duration_without_end_uses_now() {
        let source = daily_source(5).await;
        let now = day(100);
        let window = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .now(now)
            .window(&source)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(window.end, now);
        assert_eq!(window.start, Some(now - Duration::days(10)));
    }

    #[tokio::test]
    async fn test_duration_without_end_uses_future_last_point() {
        let source = daily_source(30).await;
        let window = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .now(day(0))
            .window(&source)
            .await
            .unwrap()
            .unwrap();

        let end = day(29) + Duration::seconds(1);
        assert_eq!(window.end, end);
        assert_eq!(window.start, Some(end - Duration::days(10)));
    }

    #[tokio::test]
    async fn test_duration_and_end() {
        let source = daily_source(30).await;
        let request = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .end_date(day(20));

        let window = request.window(&source).await.unwrap().unwrap();
        assert_eq!(window.start, Some(day(10)));

        let values: Vec<f64> = request
            .fetch(&source)
            .await
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, (10..=20).map(|d| d as f64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_lookback_covers_averaging_and_plot_totals() {
        let source = daily_source(0).await;
        let end = day(200);

        let window = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .averaging_duration(Duration::days(102))
            .end_date(end)
            .window(&source)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(window.start, Some(end - Duration::days(112)));

        let window = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .averaging_duration(Duration::days(30))
            .plot_total_duration(TemporalAmount::Duration(Duration::days(112)))
            .end_date(end)
            .window(&source)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(window.start, Some(end - Duration::days(122)));

        // 2024-07-19 plus one month spans 31 days
        let window = SampleRequest::new(1)
            .sample_duration(Duration::days(10))
            .averaging_duration(Duration::days(5))
            .plot_total_duration(TemporalAmount::Period(CalendarPeriod::months(1)))
            .end_date(end)
            .window(&source)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(window.start, Some(end - Duration::days(41)));
    }

    #[tokio::test]
    async fn test_empty_source_gives_empty_sample() {
        let source = InMemoryDataSource::new();
        let sample = sample_data(&source, 9, Some(Duration::days(1)), None, None, None)
            .await
            .unwrap();
        assert!(sample.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_durations_rejected() {
        let source = daily_source(3).await;

        let err = SampleRequest::new(1)
            .sample_duration(Duration::zero())
            .fetch(&source)
            .await
            .unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));

        let err = SampleRequest::new(1)
            .sample_duration(Duration::days(1))
            .averaging_duration(Duration::hours(-1))
            .fetch(&source)
            .await
            .unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_huge_durations_rejected() {
        let source = daily_source(3).await;
        let huge = Duration::days(365 * 400_000);

        let err = SampleRequest::new(1)
            .sample_duration(huge)
            .end_date(day(0))
            .window(&source)
            .await
            .unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));

        let err = SampleRequest::new(1)
            .sample_duration(Duration::days(1))
            .averaging_duration(huge)
            .end_date(day(0))
            .fetch(&source)
            .await
            .unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));

        let err = SampleRequest::new(1)
            .sample_duration(huge)
            .plot_total_duration(TemporalAmount::Period(CalendarPeriod::years(1)))
            .end_date(day(0))
            .fetch(&source)
            .await
            .unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)));
    }
}
