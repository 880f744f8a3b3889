use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::Result;
use crate::import::RecordSource;
use crate::models::{ActivityType, RawActivityRow};

/// Reads a Garmin Connect style "Activities.csv" export
///
/// Only the columns the aggregation needs are deserialized; anything else
/// in the file is ignored. Rows whose activity type is not in the filter
/// are dropped here, before parsing.
#[derive(Debug, Clone)]
pub struct CsvActivitySource {
    path: PathBuf,
    activity_types: Vec<ActivityType>,
}

impl CsvActivitySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            activity_types: ActivityType::ALL.to_vec(),
        }
    }

    /// Restrict the activity types kept from the export
    pub fn with_activity_types(mut self, activity_types: Vec<ActivityType>) -> Self {
        self.activity_types = activity_types;
        self
    }

    /// Read rows from any CSV reader with a header line
    pub fn read_rows<R: Read>(&self, reader: R) -> Result<Vec<RawActivityRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut dropped = 0usize;

        for result in reader.deserialize::<RawActivityRow>() {
            let row = result?;
            match ActivityType::from_label(&row.activity_type) {
                Some(activity_type) if self.activity_types.contains(&activity_type) => {
                    rows.push(row)
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = rows.len(), "Skipped activities outside the type filter");
        }
        debug!(rows = rows.len(), "CSV rows read");

        Ok(rows)
    }
}

impl RecordSource for CsvActivitySource {
    fn rows(&self) -> Result<Vec<RawActivityRow>> {
        let file = std::fs::File::open(&self.path)?;
        self.read_rows(file)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXPORT: &str = "\
Activity Type,Date,Favorite,Title,Distance,Calories,Time,Avg HR,Max HR,Avg Speed
Running,2021-03-02 06:31:12,false,Morning Run,5.00,520,0:45:00,140,152,9:00
Cycling,2021-03-03 17:02:40,false,Commute,8.40,300,0:35:10,121,140,14.3
Hiking,2021-03-06 09:15:00,true,Ridge Loop,6.10,900,3:05:44.2,--,160,30:26
Treadmill Running,2021-03-08 19:00:00,false,Treadmill,3.00,300,0:30:00,150,165,10:00
";

    #[test]
    fn test_filters_unrecognized_activity_types() {
        let source = CsvActivitySource::new("Activities.csv");
        let rows = source.read_rows(EXPORT.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].activity_type, "Running");
        assert_eq!(rows[0].date, "2021-03-02 06:31:12");
        assert_eq!(rows[0].time, "0:45:00");
        assert_eq!(rows[0].avg_speed, "9:00");
        assert_eq!(rows[1].avg_hr, "--");
        assert_eq!(rows[2].activity_type, "Treadmill Running");
    }

    #[test]
    fn test_custom_activity_filter() {
        let source = CsvActivitySource::new("Activities.csv")
            .with_activity_types(vec![ActivityType::Running]);
        let rows = source.read_rows(EXPORT.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_optional_columns_default_to_empty() {
        let data = "Date,Activity Type,Distance,Time\n2021-03-02,Cardio,0.00,0:20:00\n";
        let source = CsvActivitySource::new("minimal.csv");
        let rows = source.read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].avg_hr, "");
        assert_eq!(rows[0].avg_speed, "");
    }

    #[test]
    fn test_reads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();

        let source = CsvActivitySource::new(file.path());
        assert_eq!(source.rows().unwrap().len(), 3);
        assert_eq!(source.source_name(), file.path().display().to_string());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CsvActivitySource::new("/nonexistent/Activities.csv");
        assert!(matches!(
            source.rows(),
            Err(crate::error::TrainLoadError::Io(_))
        ));
    }
}
