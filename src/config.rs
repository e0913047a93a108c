use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FitExploreError;
use crate::logging::LogConfig;
use crate::models::METERS_PER_MILE;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Split and pause analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,

    /// Export preferences
    #[serde(default)]
    pub export: ExportSettings,
}

/// Distance unit that splits are cut at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Mile,
    Kilometer,
    Custom { meters: f64 },
}

impl DistanceUnit {
    /// Length of one unit in meters
    pub fn meters(&self) -> f64 {
        match self {
            DistanceUnit::Mile => METERS_PER_MILE,
            DistanceUnit::Kilometer => 1000.0,
            DistanceUnit::Custom { meters } => *meters,
        }
    }

    /// Short label for table headers
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DistanceUnit::Mile => "mi",
            DistanceUnit::Kilometer => "km",
            DistanceUnit::Custom { .. } => "unit",
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mile" | "miles" | "mi" => Ok(DistanceUnit::Mile),
            "kilometer" | "kilometers" | "km" => Ok(DistanceUnit::Kilometer),
            other => match other.trim_end_matches('m').parse::<f64>() {
                Ok(meters) if meters > 0.0 => Ok(DistanceUnit::Custom { meters }),
                _ => Err(format!("Invalid distance unit: {}", s)),
            },
        }
    }
}

/// What to do with a pause that is still open when the event stream ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenPausePolicy {
    /// Only closed pauses are reported
    #[default]
    Discard,
    /// Close the pause at the final record's timestamp
    CloseAtLastRecord,
}

/// What to do with an activity that never crosses a whole unit boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortActivityPolicy {
    /// Emit no splits at all
    #[default]
    NoSplits,
    /// Emit one partial split measured from zero distance
    SinglePartial,
}

/// Analysis settings shared by the segmenter and interval builder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub open_pause: OpenPausePolicy,
    pub short_activity: ShortActivityPolicy,
    // Kept last: a custom unit serializes as a nested table
    pub unit: DistanceUnit,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            unit: DistanceUnit::Mile,
            open_pause: OpenPausePolicy::Discard,
            short_activity: ShortActivityPolicy::NoSplits,
        }
    }
}

impl AnalysisConfig {
    /// Unit length in meters
    pub fn unit_length(&self) -> f64 {
        self.unit.meters()
    }

    /// Reject settings the segmenter cannot cut splits with
    pub fn validate(&self) -> crate::error::Result<()> {
        let meters = self.unit_length();
        if !meters.is_finite() || meters <= 0.0 {
            return Err(FitExploreError::Configuration(format!(
                "distance unit must be a positive length in meters, got {}",
                meters
            )));
        }
        Ok(())
    }
}

/// Export preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory used when an export path is relative
    pub output_dir: PathBuf,

    /// Pretty-print JSON exports
    pub pretty_json: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_dir: PathBuf::from("."),
            pretty_json: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.analysis.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
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
            .join(".fitexplore")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %config_path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Save configuration to default location
    pub fn save_default(&self) -> Result<()> {
        self.save_to_file(Self::default_config_path())
    }
}
