//! Monthly aggregation of activity records
//!
//! Records are partitioned by (calendar year, calendar month). Every group is
//! reduced on its own, so groups may be finalized in parallel without
//! changing the output.

use chrono::Datelike;
use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{ActivityRecord, MonthlyAggregate, Zone};
use crate::pace::format_optional_pace;
use crate::zones::ZoneClassifier;

/// Running sums for one zone inside one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ZoneTotals {
    pace_seconds_sum: u64,
    pace_count: u32,
    heart_rate_sum: u64,
    heart_rate_count: u32,
}

impl ZoneTotals {
    fn add(&mut self, record: &ActivityRecord) {
        if let Some(pace) = record.avg_pace_seconds {
            self.pace_seconds_sum += u64::from(pace);
            self.pace_count += 1;
        }
        if let Some(hr) = record.avg_heart_rate {
            self.heart_rate_sum += u64::from(hr);
            self.heart_rate_count += 1;
        }
    }

    fn avg_pace_seconds(&self) -> Option<f64> {
        mean(self.pace_seconds_sum, self.pace_count)
    }

    fn avg_heart_rate(&self) -> Option<f64> {
        mean(self.heart_rate_sum, self.heart_rate_count)
    }
}

/// Mean over a population; an empty population has no mean
fn mean(sum: u64, count: u32) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(sum as f64 / f64::from(count))
    }
}

/// Accumulator for a single (year, month) group
#[derive(Debug, Clone)]
struct MonthAccumulator {
    year: i32,
    month: u32,
    representative_date: NaiveDate,
    activity_count: usize,
    distance_miles: Decimal,
    minutes: u64,
    seconds: u64,
    base: ZoneTotals,
    fast: ZoneTotals,
}

impl MonthAccumulator {
    fn new(first: &ActivityRecord) -> Self {
        Self {
            year: first.date.year(),
            month: first.date.month(),
            representative_date: first.date,
            activity_count: 0,
            distance_miles: Decimal::ZERO,
            minutes: 0,
            seconds: 0,
            base: ZoneTotals::default(),
            fast: ZoneTotals::default(),
        }
    }

    fn add(&mut self, record: &ActivityRecord, zone: Zone) {
        self.activity_count += 1;
        self.distance_miles += record.distance_miles;
        self.minutes += u64::from(record.duration.total_minutes);
        self.seconds += u64::from(record.duration.seconds);

        match zone {
            Zone::Base => self.base.add(record),
            Zone::Fast => self.fast.add(record),
            Zone::None => {}
        }
    }

    fn finish(self) -> MonthlyAggregate {
        // Leftover seconds below a full minute are dropped
        let cumulative_duration_minutes = self.minutes + self.seconds / 60;
        let cumulative_duration_hours = Decimal::from(cumulative_duration_minutes) / dec!(60);

        let base_pace = self.base.avg_pace_seconds();
        let fast_pace = self.fast.avg_pace_seconds();

        debug!(
            year = self.year,
            month = self.month,
            activities = self.activity_count,
            miles = %self.distance_miles,
            minutes = cumulative_duration_minutes,
            "Month aggregated"
        );

        MonthlyAggregate {
            year: self.year,
            month: self.month,
            representative_date: self.representative_date,
            activity_count: self.activity_count,
            cumulative_distance_miles: self.distance_miles,
            cumulative_duration_minutes,
            cumulative_duration_hours,
            base_run_avg_pace_seconds: base_pace,
            base_run_avg_heart_rate: self.base.avg_heart_rate(),
            base_run_avg_pace_display: format_optional_pace(base_pace),
            fast_run_avg_pace_seconds: fast_pace,
            fast_run_avg_heart_rate: self.fast.avg_heart_rate(),
            fast_run_avg_pace_display: format_optional_pace(fast_pace),
        }
    }
}

/// Groups activity records by calendar month and reduces each group
#[derive(Debug, Clone, Default)]
pub struct MonthlyAggregator {
    classifier: ZoneClassifier,
    parallel: bool,
}

impl MonthlyAggregator {
    pub fn new(classifier: ZoneClassifier) -> Self {
        Self {
            classifier,
            parallel: false,
        }
    }

    /// Finalize month groups on the rayon thread pool
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build one aggregate per month present in `records`, oldest first
    pub fn aggregate(&self, records: &[ActivityRecord]) -> Vec<MonthlyAggregate> {
        let mut groups: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();

        for record in records {
            let zone = self.classifier.classify(record);
            groups
                .entry((record.date.year(), record.date.month()))
                .or_insert_with(|| MonthAccumulator::new(record))
                .add(record, zone);
        }

        let mut aggregates: Vec<MonthlyAggregate> = if self.parallel {
            groups.into_par_iter().map(|(_, acc)| acc.finish()).collect()
        } else {
            groups.into_values().map(MonthAccumulator::finish).collect()
        };

        aggregates.sort_by(|a, b| {
            a.representative_date
                .cmp(&b.representative_date)
                .then_with(|| (a.year, a.month).cmp(&(b.year, b.month)))
        });

        aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityType, ClockDuration};
    use proptest::prelude::*;

    fn run(
        date: (i32, u32, u32),
        miles: Decimal,
        duration: (u32, u32),
        hr: Option<u16>,
        pace: Option<u32>,
    ) -> ActivityRecord {
        ActivityRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            activity_type: ActivityType::Running,
            distance_miles: miles,
            duration: ClockDuration::new(duration.0, duration.1),
            avg_heart_rate: hr,
            avg_pace_seconds: pace,
        }
    }

    #[test]
    fn test_groups_by_year_and_month() {
        let records = vec![
            run((2021, 3, 2), dec!(5.0), (45, 0), Some(140), Some(540)),
            run((2022, 3, 2), dec!(4.0), (40, 0), Some(140), Some(600)),
            run((2021, 3, 20), dec!(6.0), (50, 0), Some(150), Some(500)),
        ];

        let aggregates = MonthlyAggregator::default().aggregate(&records);

        assert_eq!(aggregates.len(), 2);
        assert_eq!((aggregates[0].year, aggregates[0].month), (2021, 3));
        assert_eq!(aggregates[0].activity_count, 2);
        assert_eq!(aggregates[0].cumulative_distance_miles, dec!(11.0));
        assert_eq!((aggregates[1].year, aggregates[1].month), (2022, 3));
    }

    #[test]
    fn test_duration_folds_second_overflow() {
        let records = vec![
            run((2021, 5, 1), dec!(1), (30, 40), None, None),
            run((2021, 5, 2), dec!(1), (20, 50), None, None),
            run((2021, 5, 3), dec!(1), (10, 55), None, None),
        ];

        let aggregates = MonthlyAggregator::default().aggregate(&records);

        // 60 minutes + floor(145 / 60) = 62; the remaining 25 s are dropped
        assert_eq!(aggregates[0].cumulative_duration_minutes, 62);
        assert_eq!(
            aggregates[0].cumulative_duration_hours,
            Decimal::from(62) / dec!(60)
        );
    }

    #[test]
    fn test_empty_zone_is_absent() {
        let records = vec![run((2021, 6, 1), dec!(3), (30, 0), Some(130), Some(620))];

        let aggregate = &MonthlyAggregator::default().aggregate(&records)[0];

        assert_eq!(aggregate.base_run_avg_pace_seconds, Some(620.0));
        assert_eq!(aggregate.base_run_avg_pace_display.as_deref(), Some("10:20"));
        assert_eq!(aggregate.fast_run_avg_pace_seconds, None);
        assert_eq!(aggregate.fast_run_avg_heart_rate, None);
        assert_eq!(aggregate.fast_run_avg_pace_display, None);
    }

    #[test]
    fn test_zone_means() {
        let records = vec![
            run((2022, 2, 1), dec!(3), (30, 0), Some(130), Some(600)),
            run((2022, 2, 8), dec!(3), (30, 0), Some(140), Some(645)),
            run((2022, 2, 20), dec!(13.1), (118, 0), Some(160), Some(541)),
        ];

        let aggregate = &MonthlyAggregator::default().aggregate(&records)[0];

        assert_eq!(aggregate.base_run_avg_heart_rate, Some(135.0));
        assert_eq!(aggregate.base_run_avg_pace_seconds, Some(622.5));
        assert_eq!(aggregate.base_run_avg_pace_display.as_deref(), Some("10:22"));
        assert_eq!(aggregate.fast_run_avg_pace_display.as_deref(), Some("9:01"));
    }

    #[test]
    fn test_zone_record_without_pace_counts_toward_heart_rate_only() {
        let records = vec![
            run((2022, 4, 1), dec!(3), (30, 0), Some(130), Some(600)),
            run((2022, 4, 2), dec!(3), (30, 0), Some(140), None),
        ];

        let aggregate = &MonthlyAggregator::default().aggregate(&records)[0];

        assert_eq!(aggregate.base_run_avg_pace_seconds, Some(600.0));
        assert_eq!(aggregate.base_run_avg_heart_rate, Some(135.0));
    }

    #[test]
    fn test_non_running_excluded_from_zone_means() {
        let mut hike = run((2021, 7, 4), dec!(8), (180, 0), Some(120), None);
        hike.activity_type = ActivityType::Hiking;
        let records = vec![hike];

        let aggregate = &MonthlyAggregator::default().aggregate(&records)[0];

        assert_eq!(aggregate.cumulative_distance_miles, dec!(8));
        assert_eq!(aggregate.base_run_avg_heart_rate, None);
    }

    #[test]
    fn test_sorted_by_representative_date() {
        let records = vec![
            run((2021, 9, 1), dec!(1), (10, 0), None, None),
            run((2020, 12, 1), dec!(1), (10, 0), None, None),
            run((2021, 1, 15), dec!(1), (10, 0), None, None),
        ];

        let aggregates = MonthlyAggregator::default().aggregate(&records);
        let months: Vec<(i32, u32)> = aggregates.iter().map(|a| (a.year, a.month)).collect();

        assert_eq!(months, vec![(2020, 12), (2021, 1), (2021, 9)]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records: Vec<ActivityRecord> = (0..120)
            .map(|i| {
                run(
                    (2018 + i / 36, (i % 12) as u32 + 1, (i % 28) as u32 + 1),
                    Decimal::from(i) / dec!(10),
                    (20 + (i % 40) as u32, (i * 7 % 60) as u32),
                    if i % 5 == 0 { None } else { Some(120 + (i % 50) as u16) },
                    Some(480 + (i * 3 % 240) as u32),
                )
            })
            .collect();

        let sequential = MonthlyAggregator::default().aggregate(&records);
        let parallel = MonthlyAggregator::default()
            .with_parallelism(true)
            .aggregate(&records);

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_input() {
        assert!(MonthlyAggregator::default().aggregate(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn test_distance_sum_is_order_independent(
            hundredths in prop::collection::vec(0i64..5000, 1..40),
            rotate in 0usize..40
        ) {
            let mut records: Vec<ActivityRecord> = hundredths
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    run((2021, 3, (i % 28) as u32 + 1), Decimal::new(*h, 2), (30, 0), None, None)
                })
                .collect();

            let expected: Decimal = hundredths.iter().map(|h| Decimal::new(*h, 2)).sum();
            let forward = MonthlyAggregator::default().aggregate(&records);

            let len = records.len();
            records.rotate_left(rotate % len);
            records.reverse();
            let shuffled = MonthlyAggregator::default().aggregate(&records);

            prop_assert_eq!(forward[0].cumulative_distance_miles, expected);
            prop_assert_eq!(shuffled[0].cumulative_distance_miles, expected);
        }
    }
}
