//! Sample transforms used ahead of plotting
//!
//! All functions expect ascending samples and return new samples; inputs are
//! never mutated.

use crate::series::types::{DataPoint, DataSample};
use crate::temporal::aligner::{attach_offset, beginning_of_local};
use crate::temporal::{AggregationWindowPreferences, TemporalAmount};
use chrono::{DateTime, Duration, FixedOffset};

/// Keep the points within `sample_duration` leading up to `end_time`
///
/// Without an end time the last point is used as the end. Without a duration
/// every point up to the end time is kept.
pub fn clip_data_sample(
    sample: &DataSample,
    end_time: Option<DateTime<FixedOffset>>,
    sample_duration: Option<Duration>,
) -> DataSample {
    let Some(last) = sample.last() else {
        return sample.clone();
    };

    let mut points: &[DataPoint] = &sample.points;
    if let Some(end) = end_time {
        let keep = points.partition_point(|p| p.timestamp <= end);
        points = &points[..keep];
    }
    if let Some(duration) = sample_duration {
        let start = end_time.unwrap_or(last.timestamp) - duration;
        let skip = points.partition_point(|p| p.timestamp < start);
        points = &points[skip..];
    }

    DataSample {
        points: points.to_vec(),
        value_kind: sample.value_kind.clone(),
    }
}

/// Replace every value with the mean of it and all earlier points no more
/// than `window` before it
pub fn calculate_moving_averages(sample: &DataSample, window: Duration) -> DataSample {
    let points = &sample.points;
    let mut averaged = Vec::with_capacity(points.len());
    let mut total = 0.0;
    let mut tail = 0;

    for (index, current) in points.iter().enumerate() {
        total += current.value;
        while current.timestamp - points[tail].timestamp > window {
            total -= points[tail].value;
            tail += 1;
        }
        let count = (index + 1 - tail) as f64;
        averaged.push(DataPoint {
            value: total / count,
            ..current.clone()
        });
    }

    DataSample {
        points: averaged,
        value_kind: sample.value_kind.clone(),
    }
}

/// Total the values in each aligned period of `plot_total_time`
///
/// The first period is the one containing the earliest relevant instant;
/// each later period starts where the previous one ended. Periods continue
/// until every point is counted and `end_time` (or `now`) is reached. Each output point
/// is stamped at its period's exclusive end and carries no label or note.
pub fn calculate_duration_accumulated_values(
    sample: &DataSample,
    plot_total_time: &TemporalAmount,
    prefs: &AggregationWindowPreferences,
    sample_duration: Option<Duration>,
    end_time: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
) -> DataSample {
    let last = sample.last().map(|p| p.timestamp);
    let latest = match (last, end_time.unwrap_or(now)) {
        (Some(last), reference) if last > reference => last,
        (_, reference) => reference,
    };

    let mut earliest = latest;
    let candidates = [
        sample.first().map(|p| p.timestamp),
        sample_duration.and_then(|d| end_time.and_then(|end| end.checked_sub_signed(d))),
        sample_duration.and_then(|d| latest.checked_sub_signed(d)),
    ];
    for candidate in candidates.into_iter().flatten() {
        if candidate < earliest {
            earliest = candidate;
        }
    }

    // Only the first period is aligned; later ones step by the amount itself
    let offset = *earliest.offset();
    let mut period_start = beginning_of_local(earliest.naive_local(), plot_total_time, prefs);
    let mut totals = Vec::new();
    let mut index = 0;

    while attach_offset(period_start, offset) < latest || index < sample.len() {
        let Some(next) = plot_total_time.add_to(period_start) else {
            tracing::warn!(
                "Period {} overflows after {}, dropping {} points",
                plot_total_time,
                period_start,
                sample.len() - index
            );
            break;
        };
        if next <= period_start {
            break;
        }
        let period_end = attach_offset(next, offset);

        let count = sample.points[index..].partition_point(|p| p.timestamp < period_end);
        let total: f64 = sample.points[index..index + count]
            .iter()
            .map(|p| p.value)
            .sum();
        index += count;

        totals.push(DataPoint::new(period_end, total));
        period_start = next;
    }

    DataSample {
        points: totals,
        value_kind: sample.value_kind.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::CalendarPeriod;
    use chrono::TimeZone;

    fn base() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 7, 1, 0, 0, 0)
            .unwrap()
    }

    fn hourly(values: &[f64]) -> DataSample {
        DataSample::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| DataPoint::new(base() + Duration::hours(i as i64), *v))
                .collect(),
        )
    }

    #[test]
    fn test_clip_empty_sample() {
        let clipped = clip_data_sample(&DataSample::empty(), Some(base()), Some(Duration::hours(1)));
        assert!(clipped.is_empty());
    }

    #[test]
    fn test_clip_without_end_or_duration() {
        let sample = hourly(&[1.0, 2.0, 3.0]);
        assert_eq!(clip_data_sample(&sample, None, None), sample);
    }

    #[test]
    fn test_clip_duration_from_last_point_inclusive() {
        let sample = hourly(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let clipped = clip_data_sample(&sample, None, Some(Duration::hours(2)));
        let values: Vec<f64> = clipped.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_clip_end_time_inclusive() {
        let sample = hourly(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let clipped = clip_data_sample(&sample, Some(base() + Duration::hours(2)), None);
        let values: Vec<f64> = clipped.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clip_end_time_and_duration() {
        let sample = hourly(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let clipped = clip_data_sample(
            &sample,
            Some(base() + Duration::hours(3)),
            Some(Duration::minutes(90)),
        );
        let values: Vec<f64> = clipped.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_clip_everything_excluded() {
        let sample = hourly(&[1.0, 2.0]);
        assert!(clip_data_sample(&sample, Some(base() - Duration::hours(1)), None).is_empty());
        assert!(clip_data_sample(
            &sample,
            Some(base() + Duration::days(5)),
            Some(Duration::hours(1))
        )
        .is_empty());
    }

    #[test]
    fn test_moving_averages() {
        let sample = hourly(&[2.0, 4.0, 6.0, 8.0]);
        let averaged = calculate_moving_averages(&sample, Duration::hours(1));
        let values: Vec<f64> = averaged.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 5.0, 7.0]);

        let timestamps: Vec<_> = averaged.iter().map(|p| p.timestamp).collect();
        let original: Vec<_> = sample.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, original);
    }

    #[test]
    fn test_moving_averages_keep_labels() {
        let sample = DataSample::new(vec![DataPoint::new(base(), 1.0).label("a").note("n")]);
        let averaged = calculate_moving_averages(&sample, Duration::days(1));
        assert_eq!(averaged.points[0].label, "a");
        assert_eq!(averaged.points[0].note, "n");
    }

    #[test]
    fn test_duration_accumulated_daily_totals() {
        // Two points per day for three days
        let points = (0..6)
            .map(|i| DataPoint::new(base() + Duration::hours(i * 12 + 1), 1.0 + i as f64).label("x"))
            .collect();
        let sample = DataSample::new(points);
        let now = base() + Duration::days(3) - Duration::hours(1);

        let totals = calculate_duration_accumulated_values(
            &sample,
            &TemporalAmount::Period(CalendarPeriod::days(1)),
            &AggregationWindowPreferences::default(),
            None,
            None,
            now,
        );

        let values: Vec<f64> = totals.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 7.0, 11.0]);
        assert_eq!(totals.points[0].timestamp, base() + Duration::days(1));
        assert!(totals.iter().all(|p| p.label.is_empty()));
    }

    #[test]
    fn test_duration_accumulated_empty_periods_are_zero() {
        let sample = DataSample::new(vec![DataPoint::new(base() + Duration::hours(1), 5.0)]);
        let totals = calculate_duration_accumulated_values(
            &sample,
            &TemporalAmount::Period(CalendarPeriod::days(1)),
            &AggregationWindowPreferences::default(),
            Some(Duration::days(2)),
            Some(base() + Duration::days(3)),
            base(),
        );

        let values: Vec<f64> = totals.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![5.0, 0.0, 0.0]);
    }

    fn daily_ones(days: i64) -> DataSample {
        let start = base() + Duration::hours(12);
        DataSample::new(
            (0..days)
                .map(|d| DataPoint::new(start + Duration::days(d), 1.0))
                .collect(),
        )
    }

    fn accumulate(sample: &DataSample, amount: TemporalAmount) -> DataSample {
        let now = sample.last().map(|p| p.timestamp).unwrap_or_else(base);
        calculate_duration_accumulated_values(
            sample,
            &amount,
            &AggregationWindowPreferences::default(),
            None,
            None,
            now,
        )
    }

    fn total(sample: &DataSample) -> f64 {
        sample.iter().map(|p| p.value).sum()
    }

    #[test]
    fn test_duration_accumulated_fixed_days_keeps_every_point() {
        let sample = daily_ones(90);
        let totals = accumulate(&sample, TemporalAmount::Duration(Duration::days(30)));

        assert_eq!(total(&totals), 90.0);
        // First period starts on the Monday before July 1 2020
        let first_start = base() - Duration::days(2);
        let stamps: Vec<_> = totals.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            stamps,
            (1..=4)
                .map(|i| first_start + Duration::days(30 * i))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_duration_accumulated_fixed_hours_keeps_every_point() {
        let sample = hourly(&[1.0; 30]);
        let totals = accumulate(&sample, TemporalAmount::Duration(Duration::hours(2)));

        assert_eq!(total(&totals), 30.0);
        assert_eq!(totals.len(), 15);
        assert!(totals.iter().all(|p| p.value == 2.0));
        assert_eq!(totals.points[0].timestamp, base() + Duration::hours(2));
    }

    #[test]
    fn test_duration_accumulated_months_keeps_every_point() {
        let sample = daily_ones(90);
        let totals = accumulate(&sample, TemporalAmount::Period(CalendarPeriod::months(1)));

        assert_eq!(total(&totals), 90.0);
        let values: Vec<f64> = totals.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![31.0, 31.0, 28.0]);
        assert_eq!(totals.points[0].timestamp, base() + Duration::days(31));
    }
}
