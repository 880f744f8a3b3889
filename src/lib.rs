// Library interface for trainload modules
// Integration tests and the CLI both build on these

pub mod aggregate;
pub mod config;
pub mod duration;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod models;
pub mod pace;
pub mod pipeline;
pub mod zones;

// Re-export commonly used types for convenience
pub use aggregate::MonthlyAggregator;
pub use config::AppConfig;
pub use duration::DurationParser;
pub use error::{ParseError, Result, TrainLoadError};
pub use export::{AggregateSink, ExportFormat};
pub use import::{CsvActivitySource, InMemorySource, RecordSource};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use pace::format_pace;
pub use pipeline::Pipeline;
pub use zones::{ZoneClassifier, DEFAULT_BASE_ZONE_MAX_HR};
