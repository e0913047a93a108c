use crate::activity::{Activity, ActivitySummary};
use crate::config::ExportSettings;
use crate::error::ExportError;
use crate::heart_rate::{ChartAxis, StoppedSpan};
use crate::models::{HeartRateDataPoint, Interval, Split, METERS_PER_MILE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// What part of the analysis to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportType {
    Splits,
    HeartRate,
    Coordinates,
    Report,
}

impl std::str::FromStr for ExportType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "splits" => Ok(ExportType::Splits),
            "heart-rate" | "hr" => Ok(ExportType::HeartRate),
            "coordinates" | "coords" => Ok(ExportType::Coordinates),
            "report" => Ok(ExportType::Report),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Everything derived from one activity, in a serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Distance unit abbreviation used for splits and pace
    pub unit: String,
    /// Length of that unit in meters
    pub unit_meters: f64,
    pub summary: ActivitySummary,
    pub splits: Vec<Split>,
    pub paused_intervals: Vec<Interval>,
    pub heart_rate_runs: Vec<Vec<HeartRateDataPoint>>,
    pub stopped_spans: Vec<StoppedSpan>,
}

impl ActivityReport {
    pub fn from_activity(activity: &Activity) -> Self {
        ActivityReport {
            unit: activity.config().unit.abbreviation().to_string(),
            unit_meters: activity.config().unit_length(),
            summary: activity.summary(),
            splits: activity.splits().to_vec(),
            paused_intervals: activity.paused_intervals().to_vec(),
            heart_rate_runs: activity.heart_rate_runs().to_vec(),
            stopped_spans: activity.stopped_spans(ChartAxis::Time),
        }
    }
}

/// Export manager dispatching to the format-specific writers
pub struct ExportManager {
    pretty_json: bool,
}

impl ExportManager {
    pub fn new() -> Self {
        Self::with_settings(&ExportSettings::default())
    }

    pub fn with_settings(settings: &ExportSettings) -> Self {
        ExportManager {
            pretty_json: settings.pretty_json,
        }
    }

    /// Write `export_type` of `activity` to `output_path` as `format`
    pub fn export<P: AsRef<Path>>(
        &self,
        activity: &Activity,
        export_type: ExportType,
        format: ExportFormat,
        output_path: P,
    ) -> Result<(), ExportError> {
        let output_path = output_path.as_ref();

        match (export_type, format) {
            (ExportType::Splits, ExportFormat::Csv) => {
                csv::export_splits(activity.splits(), output_path)?
            }
            (ExportType::HeartRate, ExportFormat::Csv) => {
                csv::export_heart_rate(activity.heart_rate_series(), output_path)?
            }
            (ExportType::Coordinates, ExportFormat::Csv) => {
                csv::export_coordinates(activity.coordinates(), output_path)?
            }
            (ExportType::Splits, ExportFormat::Json) => {
                json::export_json(&activity.splits(), output_path, self.pretty_json)?
            }
            (ExportType::HeartRate, ExportFormat::Json) => {
                json::export_json(&activity.heart_rate_runs(), output_path, self.pretty_json)?
            }
            (ExportType::Coordinates, ExportFormat::Json) => {
                json::export_json(&activity.coordinates(), output_path, self.pretty_json)?
            }
            (ExportType::Report, ExportFormat::Json) => {
                let report = ActivityReport::from_activity(activity);
                json::export_json(&report, output_path, self.pretty_json)?
            }
            (ExportType::Splits | ExportType::Report, ExportFormat::Text) => {
                text::export_report(&ActivityReport::from_activity(activity), output_path)?
            }
            (export_type, format) => {
                return Err(ExportError::UnsupportedFormat(format!(
                    "{:?} cannot be exported as {:?}",
                    export_type, format
                )))
            }
        }

        info!(?export_type, ?format, path = %output_path.display(), "Export complete");
        Ok(())
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Pace as `m:ss`, or `--:--` when absent
pub fn format_pace(seconds_per_unit: Option<f64>) -> String {
    match seconds_per_unit {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            let total = seconds.round() as i64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        _ => "--:--".to_string(),
    }
}

/// Signed elevation change, or `--` when absent
pub fn format_elevation(feet: Option<i32>) -> String {
    match feet {
        Some(change) if change > 0 => format!("+{}", change),
        Some(change) => change.to_string(),
        None => "--".to_string(),
    }
}

/// Heart rate with unit, or `-:--` when absent
pub fn format_heart_rate(bpm: Option<u32>) -> String {
    match bpm {
        Some(bpm) => format!("{} bpm", bpm),
        None => "-:--".to_string(),
    }
}

/// Whole elapsed minutes for a time-axis label
pub fn format_axis_minutes(seconds: f64) -> String {
    format!("{}m", (seconds / 60.0) as i64)
}

/// Miles with one decimal for a distance-axis label
pub fn format_axis_miles(meters: f64) -> String {
    format!("{:.1} mi", meters / METERS_PER_MILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_export_type_from_str() {
        assert_eq!("heart_rate".parse::<ExportType>().unwrap(), ExportType::HeartRate);
        assert_eq!("coords".parse::<ExportType>().unwrap(), ExportType::Coordinates);
        assert!("zones".parse::<ExportType>().is_err());
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(Some(512.0)), "8:32");
        assert_eq!(format_pace(Some(451.4)), "7:31");
        assert_eq!(format_pace(Some(59.6)), "1:00");
        assert_eq!(format_pace(None), "--:--");
        assert_eq!(format_pace(Some(f64::INFINITY)), "--:--");
    }

    #[test]
    fn test_format_elevation() {
        assert_eq!(format_elevation(Some(41)), "+41");
        assert_eq!(format_elevation(Some(-5)), "-5");
        assert_eq!(format_elevation(Some(0)), "0");
        assert_eq!(format_elevation(None), "--");
    }

    #[test]
    fn test_format_heart_rate() {
        assert_eq!(format_heart_rate(Some(151)), "151 bpm");
        assert_eq!(format_heart_rate(None), "-:--");
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(format_axis_minutes(754.0), "12m");
        assert_eq!(format_axis_miles(2414.01), "1.5 mi");
    }
}
