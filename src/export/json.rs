use serde::Serialize;
use std::io::Write;

use super::AggregateSink;
use crate::error::Result;
use crate::models::{MonthlyAggregate, PaceExtremes};

/// Pretty-printed JSON report of every month plus the base pace extremes
#[derive(Debug, Clone, Default)]
pub struct JsonSink;

#[derive(Debug, Serialize)]
struct MonthlyReport<'a> {
    months: &'a [MonthlyAggregate],
    base_pace_extremes: Option<PaceExtremes>,
}

impl JsonSink {
    pub fn new() -> Self {
        JsonSink
    }
}

impl AggregateSink for JsonSink {
    fn write_to(&self, aggregates: &[MonthlyAggregate], out: &mut dyn Write) -> Result<()> {
        let report = MonthlyReport {
            months: aggregates,
            base_pace_extremes: PaceExtremes::from_aggregates(aggregates),
        };

        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_absent_statistics_serialize_as_null() {
        let aggregate = MonthlyAggregate {
            year: 2022,
            month: 2,
            representative_date: NaiveDate::from_ymd_opt(2022, 2, 20).unwrap(),
            activity_count: 1,
            cumulative_distance_miles: dec!(13.1),
            cumulative_duration_minutes: 118,
            cumulative_duration_hours: dec!(1.9666),
            base_run_avg_pace_seconds: None,
            base_run_avg_heart_rate: None,
            base_run_avg_pace_display: None,
            fast_run_avg_pace_seconds: Some(541.0),
            fast_run_avg_heart_rate: Some(160.0),
            fast_run_avg_pace_display: Some("9:01".to_string()),
        };

        let mut out = Vec::new();
        JsonSink::new().write_to(&[aggregate], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let month = &value["months"][0];
        assert_eq!(month["cumulative_distance_miles"], "13.1");
        assert!(month["base_run_avg_heart_rate"].is_null());
        assert_eq!(month["fast_run_avg_pace_display"], "9:01");
        assert_eq!(month["representative_date"], "2022-02-20");
        assert!(value["base_pace_extremes"].is_null());
    }
}
