//! Heart-rate series for charting
//!
//! Every record with a heart rate becomes one point tagged with whether it
//! fell inside a paused interval. The points can also be grouped into runs
//! that break at every pause boundary, so a chart can draw each run as its
//! own line and shade the stopped regions between them.

use crate::intervals::ActiveIntervalBuilder;
use crate::models::{HeartRateDataPoint, Interval, Record};
use serde::{Deserialize, Serialize};

/// X-axis used when charting heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartAxis {
    Time,
    Distance,
}

impl std::str::FromStr for ChartAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time" => Ok(ChartAxis::Time),
            "distance" => Ok(ChartAxis::Distance),
            _ => Err(format!("Invalid chart axis: {}", s)),
        }
    }
}

/// Region of the chart x-axis during which the timer was stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppedSpan {
    pub start: f64,
    pub end: f64,
}

/// Builds heart-rate points and runs from records
pub struct HeartRateBucketer;

impl HeartRateBucketer {
    /// Flat, ordered series of tagged heart-rate points
    pub fn series(records: &[Record], paused: &[Interval]) -> Vec<HeartRateDataPoint> {
        records
            .iter()
            .filter_map(|record| {
                let timestamp = record.timestamp?;
                let heart_rate = record.heart_rate?;
                Some(HeartRateDataPoint {
                    timestamp,
                    distance: record.distance,
                    heart_rate,
                    is_stopped: ActiveIntervalBuilder::is_paused(paused, timestamp),
                })
            })
            .collect()
    }

    /// The same series partitioned into contiguous runs.
    ///
    /// A new run starts whenever a pause boundary lies between two
    /// consecutive points, including back-to-back pauses.
    pub fn runs(records: &[Record], paused: &[Interval]) -> Vec<Vec<HeartRateDataPoint>> {
        let edges: Vec<i64> = paused.iter().flat_map(|i| [i.start, i.end]).collect();
        let bucket_of = |timestamp: i64| edges.partition_point(|&edge| edge <= timestamp);

        let mut runs: Vec<Vec<HeartRateDataPoint>> = Vec::new();
        let mut current_bucket = None;

        for point in Self::series(records, paused) {
            let bucket = bucket_of(point.timestamp);
            let starts_new_run = current_bucket != Some(bucket);
            current_bucket = Some(bucket);

            if starts_new_run {
                runs.push(vec![point]);
            } else if let Some(run) = runs.last_mut() {
                run.push(point);
            }
        }

        runs
    }
}

/// X-axis position of a point, if it has one on `axis`
fn position(point: &HeartRateDataPoint, axis: ChartAxis) -> Option<f64> {
    match axis {
        ChartAxis::Time => Some(point.timestamp as f64),
        ChartAxis::Distance => point.distance,
    }
}

/// Regions to shade behind the heart-rate lines.
///
/// One span per pair of consecutive runs, from the last point of a run to
/// the first point of the next. Spans are ordered and never overlap; a pair
/// whose endpoints lack a position on `axis` is skipped.
pub fn stopped_spans(runs: &[Vec<HeartRateDataPoint>], axis: ChartAxis) -> Vec<StoppedSpan> {
    runs.windows(2)
        .filter_map(|pair| {
            let start = pair[0].last().and_then(|p| position(p, axis))?;
            let end = pair[1].first().and_then(|p| position(p, axis))?;
            Some(StoppedSpan { start, end })
        })
        .collect()
}
