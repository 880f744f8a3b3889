use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Activity types recognized in the exercise log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Running,
    Hiking,
    TreadmillRunning,
    Mountaineering,
    Cardio,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Running,
        ActivityType::Hiking,
        ActivityType::TreadmillRunning,
        ActivityType::Mountaineering,
        ActivityType::Cardio,
    ];

    /// Label used by the activity export
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Hiking => "Hiking",
            ActivityType::TreadmillRunning => "Treadmill Running",
            ActivityType::Mountaineering => "Mountaineering",
            ActivityType::Cardio => "Cardio",
        }
    }

    /// Parse an export label; unrecognized labels yield `None`
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Whether pace values are meaningful for this activity
    pub fn is_running(&self) -> bool {
        matches!(self, ActivityType::Running | ActivityType::TreadmillRunning)
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One unparsed row from the record source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActivityRow {
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Activity Type")]
    pub activity_type: String,

    #[serde(rename = "Distance")]
    pub distance: String,

    /// Clock duration, "H:MM:SS" with an occasional fractional suffix
    #[serde(rename = "Time")]
    pub time: String,

    #[serde(rename = "Avg HR", default)]
    pub avg_hr: String,

    /// Carried through from the export but not used by the aggregation
    #[serde(rename = "Max HR", default)]
    pub max_hr: String,

    /// Average pace, "MM:SS" per mile
    #[serde(rename = "Avg Speed", default)]
    pub avg_speed: String,
}

/// Duration split into whole minutes and a leftover second count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockDuration {
    /// hours * 60 + minutes
    pub total_minutes: u32,
    pub seconds: u32,
}

impl ClockDuration {
    pub fn new(total_minutes: u32, seconds: u32) -> Self {
        Self {
            total_minutes,
            seconds,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.total_minutes) * 60 + u64::from(self.seconds)
    }
}

/// Parsed exercise activity, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Calendar day of the activity (time of day discarded)
    pub date: NaiveDate,

    pub activity_type: ActivityType,

    /// Distance covered in miles
    pub distance_miles: Decimal,

    pub duration: ClockDuration,

    /// Average heart rate; `None` when the export marks it unavailable
    pub avg_heart_rate: Option<u16>,

    /// Average pace in seconds per mile, running activities only
    pub avg_pace_seconds: Option<u32>,
}

/// Training-intensity zone of a single activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Running below the aerobic threshold
    Base,
    /// Running at or above the aerobic threshold
    Fast,
    /// Not a run, or no heart rate recorded
    None,
}

/// Summary of one calendar month of training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,

    /// A date inside the month, used for display and ordering
    pub representative_date: NaiveDate,

    pub activity_count: usize,

    pub cumulative_distance_miles: Decimal,

    /// Whole minutes; leftover seconds below a full minute are dropped
    pub cumulative_duration_minutes: u64,

    pub cumulative_duration_hours: Decimal,

    pub base_run_avg_pace_seconds: Option<f64>,
    pub base_run_avg_heart_rate: Option<f64>,
    pub base_run_avg_pace_display: Option<String>,

    pub fast_run_avg_pace_seconds: Option<f64>,
    pub fast_run_avg_heart_rate: Option<f64>,
    pub fast_run_avg_pace_display: Option<String>,
}

/// Fastest and slowest monthly base pace across a run of aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceExtremes {
    pub fastest_date: NaiveDate,
    pub fastest_pace_seconds: f64,
    pub slowest_date: NaiveDate,
    pub slowest_pace_seconds: f64,
}

impl PaceExtremes {
    /// Locate the minimum and maximum base pace; `None` when no month has one
    pub fn from_aggregates(aggregates: &[MonthlyAggregate]) -> Option<Self> {
        let mut paces = aggregates.iter().filter_map(|a| {
            a.base_run_avg_pace_seconds
                .map(|pace| (a.representative_date, pace))
        });

        let first = paces.next()?;
        let (mut fastest, mut slowest) = (first, first);

        for (date, pace) in paces {
            if pace < fastest.1 {
                fastest = (date, pace);
            }
            if pace > slowest.1 {
                slowest = (date, pace);
            }
        }

        Some(PaceExtremes {
            fastest_date: fastest.0,
            fastest_pace_seconds: fastest.1,
            slowest_date: slowest.0,
            slowest_pace_seconds: slowest.1,
        })
    }
}
