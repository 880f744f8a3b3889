use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::models::ActivityType;
use crate::pipeline::DEFAULT_MISSING_MARKER;
use crate::zones::DEFAULT_BASE_ZONE_MAX_HR;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Heart-rate zone settings
    pub zones: ZoneSettings,

    /// Record source preferences
    pub import: ImportSettings,

    /// Aggregation behavior
    pub aggregation: AggregationSettings,

    /// Output preferences
    pub export: ExportSettings,

    /// Logging setup
    pub logging: LogConfig,
}

/// Training zone settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// Runs averaging below this heart rate are base runs
    pub base_zone_max_hr: u16,
}

/// Record source preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Activity labels kept from the export
    pub activity_types: Vec<String>,

    /// Placeholder the export writes for unavailable values
    pub missing_marker: String,
}

/// Aggregation behavior
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Finalize month groups in parallel
    pub parallel: bool,
}

/// Output preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Decimal places for numeric columns
    pub decimal_places: u32,

    /// Only report months from the month of this date onward
    pub since: Option<NaiveDate>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        ZoneSettings {
            base_zone_max_hr: DEFAULT_BASE_ZONE_MAX_HR,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            activity_types: ActivityType::ALL
                .iter()
                .map(|t| t.label().to_string())
                .collect(),
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            decimal_places: 2,
            since: None,
        }
    }
}

impl ImportSettings {
    /// Activity types to keep; labels outside the recognized set are ignored
    pub fn activity_filter(&self) -> Vec<ActivityType> {
        self.activity_types
            .iter()
            .filter_map(|label| ActivityType::from_label(label))
            .collect()
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".trainload")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %e,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.zones.base_zone_max_hr == 0 {
            anyhow::bail!("zones.base_zone_max_hr must be greater than zero");
        }
        if self.import.missing_marker.trim().is_empty() {
            anyhow::bail!("import.missing_marker must not be blank");
        }
        if self.import.activity_filter().is_empty() {
            anyhow::bail!("import.activity_types contains no recognized activity type");
        }
        Ok(())
    }
}
