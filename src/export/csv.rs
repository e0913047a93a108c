use crate::error::ExportError;
use crate::models::{Coordinate, HeartRateDataPoint, Split};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct SplitRow {
    split: usize,
    distance: String,
    pace_seconds: Option<f64>,
    pace: String,
    avg_heart_rate: Option<u32>,
    elevation_change_ft: Option<i32>,
}

impl From<&Split> for SplitRow {
    fn from(split: &Split) -> Self {
        SplitRow {
            split: split.id,
            distance: split.distance_label(),
            pace_seconds: split.pace_seconds_per_unit.map(|p| (p * 10.0).round() / 10.0),
            pace: super::format_pace(split.pace_seconds_per_unit),
            avg_heart_rate: split.avg_heart_rate,
            elevation_change_ft: split.elevation_change,
        }
    }
}

#[derive(Serialize)]
struct HeartRateRow {
    timestamp: i64,
    distance_m: Option<f64>,
    heart_rate: u8,
    stopped: bool,
}

/// Write splits as CSV to any writer
pub fn write_splits<W: Write>(splits: &[Split], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for split in splits {
        csv_writer.serialize(SplitRow::from(split))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export splits to a CSV file
pub fn export_splits<P: AsRef<Path>>(splits: &[Split], output_path: P) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_splits(splits, file)
}

/// Export the heart-rate series to a CSV file
pub fn export_heart_rate<P: AsRef<Path>>(
    series: &[HeartRateDataPoint],
    output_path: P,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_path(output_path)?;
    for point in series {
        csv_writer.serialize(HeartRateRow {
            timestamp: point.timestamp,
            distance_m: point.distance,
            heart_rate: point.heart_rate,
            stopped: point.is_stopped,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export coordinates in degrees to a CSV file
pub fn export_coordinates<P: AsRef<Path>>(
    coordinates: &[Coordinate],
    output_path: P,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_path(output_path)?;
    for coordinate in coordinates {
        csv_writer.serialize(coordinate)?;
    }
    csv_writer.flush()?;
    Ok(())
}
