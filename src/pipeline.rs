use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::aggregate::MonthlyAggregator;
use crate::config::AppConfig;
use crate::duration::DurationParser;
use crate::error::{ParseError, Result, TrainLoadError};
use crate::import::RecordSource;
use crate::models::{ActivityRecord, ActivityType, MonthlyAggregate, RawActivityRow};
use crate::zones::ZoneClassifier;

/// Marker the activity export uses for a value it could not record
pub const DEFAULT_MISSING_MARKER: &str = "--";

/// Raw rows in, monthly aggregates out
///
/// Every row is parsed before anything is aggregated. The first malformed
/// row aborts the run so no partially-correct totals are produced.
#[derive(Debug, Clone)]
pub struct Pipeline {
    aggregator: MonthlyAggregator,
    since: Option<NaiveDate>,
    missing_marker: String,
}

impl Pipeline {
    pub fn new(aggregator: MonthlyAggregator) -> Self {
        Self {
            aggregator,
            since: None,
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let classifier = ZoneClassifier::new(config.zones.base_zone_max_hr);
        Self::new(MonthlyAggregator::new(classifier).with_parallelism(config.aggregation.parallel))
            .with_since(config.export.since)
            .with_missing_marker(config.import.missing_marker.clone())
    }

    /// Drop months that end before `since`
    ///
    /// The cutoff applies to whole months: the month containing `since` is
    /// reported with all of its activities.
    pub fn with_since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since;
        self
    }

    pub fn with_missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.missing_marker = marker.into();
        self
    }

    /// Parse and aggregate rows pulled from a record source
    pub fn run_source(&self, source: &dyn RecordSource) -> Result<Vec<MonthlyAggregate>> {
        let rows = source.rows()?;
        self.run(&rows)
    }

    /// Parse, classify, group, average and sort
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: &[RawActivityRow]) -> Result<Vec<MonthlyAggregate>> {
        let records = self.parse_records(rows)?;
        let mut aggregates = self.aggregator.aggregate(&records);

        if let Some(since) = self.since {
            let first_month = (since.year(), since.month());
            aggregates.retain(|a| (a.year, a.month) >= first_month);
        }

        info!(
            records = records.len(),
            months = aggregates.len(),
            "Monthly aggregation complete"
        );

        Ok(aggregates)
    }

    /// Parse every row, stopping at the first malformed one
    pub fn parse_records(&self, rows: &[RawActivityRow]) -> Result<Vec<ActivityRecord>> {
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            records.push(self.parse_record(index, row)?);
        }

        Ok(records)
    }

    /// Turn one raw row into an activity record
    pub fn parse_record(&self, index: usize, row: &RawActivityRow) -> Result<ActivityRecord> {
        let date = parse_date(index, &row.date)?;
        let date_label = date.format("%Y-%m-%d").to_string();
        let record_error = |field: &'static str, source: ParseError| TrainLoadError::Record {
            index,
            date: date_label.clone(),
            field,
            source,
        };

        let activity_type = ActivityType::from_label(&row.activity_type).ok_or_else(|| {
            record_error(
                "activity type",
                ParseError::InvalidField {
                    raw: row.activity_type.clone(),
                    field: row.activity_type.trim().to_string(),
                },
            )
        })?;

        let distance_miles = self
            .parse_distance(&row.distance)
            .map_err(|e| record_error("distance", e))?;

        let duration =
            DurationParser::parse_clock(&row.time).map_err(|e| record_error("duration", e))?;

        let avg_heart_rate = self
            .parse_heart_rate(&row.avg_hr)
            .map_err(|e| record_error("heart rate", e))?;

        let avg_pace_seconds = if activity_type.is_running() && !self.is_missing(&row.avg_speed) {
            Some(DurationParser::parse_pace(&row.avg_speed).map_err(|e| record_error("pace", e))?)
        } else {
            None
        };

        Ok(ActivityRecord {
            date,
            activity_type,
            distance_miles,
            duration,
            avg_heart_rate,
            avg_pace_seconds,
        })
    }

    fn is_missing(&self, raw: &str) -> bool {
        let raw = raw.trim();
        raw.is_empty() || raw == self.missing_marker
    }

    /// Missing distance contributes nothing to the monthly sum
    fn parse_distance(&self, raw: &str) -> std::result::Result<Decimal, ParseError> {
        if self.is_missing(raw) {
            return Ok(Decimal::ZERO);
        }

        let cleaned = raw.trim().replace(',', "");
        match Decimal::from_str(&cleaned) {
            Ok(miles) if !miles.is_sign_negative() => Ok(miles),
            _ => Err(ParseError::InvalidField {
                raw: raw.to_string(),
                field: cleaned,
            }),
        }
    }

    fn parse_heart_rate(&self, raw: &str) -> std::result::Result<Option<u16>, ParseError> {
        if self.is_missing(raw) {
            return Ok(None);
        }

        let trimmed = raw.trim();
        trimmed
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ParseError::InvalidField {
                raw: raw.to_string(),
                field: trimmed.to_string(),
            })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(MonthlyAggregator::default())
    }
}

/// Day-precision date; any time-of-day suffix is ignored
fn parse_date(index: usize, raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);

    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| TrainLoadError::InvalidDate {
        index,
        raw: raw.to_string(),
    })
}
