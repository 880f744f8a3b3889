use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::{Result, TrainLoadError};
use crate::models::MonthlyAggregate;

#[cfg(feature = "charts")]
pub mod chart;
pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
    Chart,
}

impl std::str::FromStr for ExportFormat {
    type Err = TrainLoadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            "chart" | "svg" => Ok(ExportFormat::Chart),
            _ => Err(TrainLoadError::Configuration(format!(
                "Unsupported export format: {}",
                s
            ))),
        }
    }
}

impl ExportFormat {
    /// Guess the format from an output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

/// Consumer of the finished monthly aggregates
pub trait AggregateSink {
    /// Serialize the aggregates into `out`
    fn write_to(&self, aggregates: &[MonthlyAggregate], out: &mut dyn Write) -> Result<()>;

    /// Name used in log output
    fn format_name(&self) -> &'static str;
}

/// Build the sink for a format
pub fn sink_for(format: ExportFormat, decimal_places: u32) -> Result<Box<dyn AggregateSink>> {
    match format {
        ExportFormat::Csv => Ok(Box::new(csv::CsvSink::new(decimal_places))),
        ExportFormat::Json => Ok(Box::new(json::JsonSink::new())),
        ExportFormat::Text => Ok(Box::new(text::TextSink::new(decimal_places))),
        #[cfg(feature = "charts")]
        ExportFormat::Chart => Ok(Box::new(chart::ChartSink::default())),
        #[cfg(not(feature = "charts"))]
        ExportFormat::Chart => Err(TrainLoadError::Configuration(
            "chart export requires building with the `charts` feature".to_string(),
        )),
    }
}

/// Write aggregates to a file through the given sink
pub fn export_to_path<P: AsRef<Path>>(
    sink: &dyn AggregateSink,
    aggregates: &[MonthlyAggregate],
    output_path: P,
) -> Result<()> {
    let path = output_path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    sink.write_to(aggregates, &mut writer)?;
    writer.flush()?;

    info!(
        path = %path.display(),
        format = sink.format_name(),
        months = aggregates.len(),
        "Aggregates exported"
    );
    Ok(())
}

/// Render a value with a fixed number of decimal places
pub(crate) fn round_to(value: f64, decimal_places: u32) -> String {
    format!("{:.*}", decimal_places as usize, value)
}
