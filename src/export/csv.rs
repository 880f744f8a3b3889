use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

use super::{round_to, AggregateSink};
use crate::error::Result;
use crate::models::MonthlyAggregate;

/// Spreadsheet-friendly CSV, one row per month
///
/// Numeric columns are rounded to the configured number of decimal places;
/// absent zone statistics are written as empty cells.
#[derive(Debug, Clone)]
pub struct CsvSink {
    decimal_places: u32,
}

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Cum_Miles_Monthly")]
    cum_miles: String,
    #[serde(rename = "Cum_Hr_Monthly")]
    cum_hours: String,
    #[serde(rename = "Base_Run_HR_Avg")]
    base_hr: Option<String>,
    #[serde(rename = "Base_Run_Pace_Avg")]
    base_pace: Option<String>,
    #[serde(rename = "Base_Run_Pace_Avg_Sec")]
    base_pace_sec: Option<String>,
    #[serde(rename = "Fast_Run_HR_Avg")]
    fast_hr: Option<String>,
    #[serde(rename = "Fast_Run_Pace_Avg")]
    fast_pace: Option<String>,
    #[serde(rename = "Fast_Run_Pace_Avg_Sec")]
    fast_pace_sec: Option<String>,
}

impl CsvSink {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    fn to_row(&self, aggregate: &MonthlyAggregate) -> CsvRow {
        let dp = self.decimal_places;
        let round = |value: Option<f64>| value.map(|v| round_to(v, dp));
        let fixed = |value: Decimal| format!("{:.*}", dp as usize, value.round_dp(dp));

        CsvRow {
            date: aggregate.representative_date.format("%Y-%m-%d").to_string(),
            cum_miles: fixed(aggregate.cumulative_distance_miles),
            cum_hours: fixed(aggregate.cumulative_duration_hours),
            base_hr: round(aggregate.base_run_avg_heart_rate),
            base_pace: aggregate.base_run_avg_pace_display.clone(),
            base_pace_sec: round(aggregate.base_run_avg_pace_seconds),
            fast_hr: round(aggregate.fast_run_avg_heart_rate),
            fast_pace: aggregate.fast_run_avg_pace_display.clone(),
            fast_pace_sec: round(aggregate.fast_run_avg_pace_seconds),
        }
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new(2)
    }
}

impl AggregateSink for CsvSink {
    fn write_to(&self, aggregates: &[MonthlyAggregate], out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);

        if aggregates.is_empty() {
            // serialize() emits the header with the first row only
            writer.write_record([
                "Date",
                "Cum_Miles_Monthly",
                "Cum_Hr_Monthly",
                "Base_Run_HR_Avg",
                "Base_Run_Pace_Avg",
                "Base_Run_Pace_Avg_Sec",
                "Fast_Run_HR_Avg",
                "Fast_Run_Pace_Avg",
                "Fast_Run_Pace_Avg_Sec",
            ])?;
        }

        for aggregate in aggregates {
            writer.serialize(self.to_row(aggregate))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "csv"
    }
}
