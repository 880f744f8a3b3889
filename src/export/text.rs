use rust_decimal::Decimal;
use std::io::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{round_to, AggregateSink};
use crate::error::Result;
use crate::models::{MonthlyAggregate, PaceExtremes};
use crate::pace::format_pace;

/// Human-readable monthly table for the terminal
#[derive(Debug, Clone)]
pub struct TextSink {
    decimal_places: u32,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Miles")]
    miles: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Base HR")]
    base_hr: String,
    #[tabled(rename = "Base Pace")]
    base_pace: String,
    #[tabled(rename = "Fast HR")]
    fast_hr: String,
    #[tabled(rename = "Fast Pace")]
    fast_pace: String,
}

impl TextSink {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    fn to_row(&self, aggregate: &MonthlyAggregate) -> MonthRow {
        let dp = self.decimal_places;
        let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        let fixed = |value: Decimal| format!("{:.*}", dp as usize, value.round_dp(dp));

        MonthRow {
            month: aggregate.representative_date.format("%Y-%m").to_string(),
            miles: fixed(aggregate.cumulative_distance_miles),
            hours: fixed(aggregate.cumulative_duration_hours),
            base_hr: or_dash(aggregate.base_run_avg_heart_rate.map(|v| round_to(v, 0))),
            base_pace: or_dash(aggregate.base_run_avg_pace_display.clone()),
            fast_hr: or_dash(aggregate.fast_run_avg_heart_rate.map(|v| round_to(v, 0))),
            fast_pace: or_dash(aggregate.fast_run_avg_pace_display.clone()),
        }
    }
}

impl Default for TextSink {
    fn default() -> Self {
        Self::new(2)
    }
}

impl AggregateSink for TextSink {
    fn write_to(&self, aggregates: &[MonthlyAggregate], out: &mut dyn Write) -> Result<()> {
        if aggregates.is_empty() {
            writeln!(out, "No activities to summarize.")?;
            return Ok(());
        }

        let rows: Vec<MonthRow> = aggregates.iter().map(|a| self.to_row(a)).collect();
        let mut table = Table::new(rows);
        table.with(Style::modern());
        writeln!(out, "{}", table)?;

        if let Some(extremes) = PaceExtremes::from_aggregates(aggregates) {
            writeln!(out)?;
            writeln!(
                out,
                "Fastest base pace: {} ({})",
                format_pace(extremes.fastest_pace_seconds),
                extremes.fastest_date.format("%Y-%m")
            )?;
            writeln!(
                out,
                "Slowest base pace: {} ({})",
                format_pace(extremes.slowest_pace_seconds),
                extremes.slowest_date.format("%Y-%m")
            )?;
        }

        let total_miles: Decimal = aggregates
            .iter()
            .map(|a| a.cumulative_distance_miles)
            .sum();
        writeln!(
            out,
            "Total: {} miles over {} months",
            total_miles.round_dp(self.decimal_places),
            aggregates.len()
        )?;

        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "text"
    }
}
