use crate::models::{ActivityRecord, ActivityType, Zone};

/// Upper bound (exclusive) of the base zone in beats per minute
///
/// Roughly 75% of maximum heart rate, the Zone 1 / Zone 2 boundary used for
/// aerobic base training.
pub const DEFAULT_BASE_ZONE_MAX_HR: u16 = 146;

/// Tags running activities as base or fast effort by average heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneClassifier {
    base_zone_max_hr: u16,
}

impl ZoneClassifier {
    pub fn new(base_zone_max_hr: u16) -> Self {
        Self { base_zone_max_hr }
    }

    pub fn threshold(&self) -> u16 {
        self.base_zone_max_hr
    }

    /// Classify a single activity
    ///
    /// Only outdoor `Running` with a recorded heart rate is zoned. Everything
    /// else is `Zone::None` and is left out of the zone averages while still
    /// counting toward distance and duration.
    pub fn classify(&self, record: &ActivityRecord) -> Zone {
        if record.activity_type != ActivityType::Running {
            return Zone::None;
        }

        match record.avg_heart_rate {
            Some(hr) if hr < self.base_zone_max_hr => Zone::Base,
            Some(_) => Zone::Fast,
            None => Zone::None,
        }
    }
}

impl Default for ZoneClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_ZONE_MAX_HR)
    }
}
