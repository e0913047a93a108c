//! Analytics engine over one decoded activity
//!
//! `Activity` owns an immutable copy of the decoded records and events. Every
//! derived output is computed on first access and cached for the lifetime of
//! the value. Caches are `OnceLock`s, so concurrent first access from several
//! threads runs the computation once and every caller sees the same result.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::heart_rate::{self, ChartAxis, HeartRateBucketer, StoppedSpan};
use crate::intervals::ActiveIntervalBuilder;
use crate::models::{
    ActivityData, Coordinate, Event, HeartRateDataPoint, Interval, Record, Split,
};
use crate::splits::SplitSegmenter;

/// Whole-activity totals for summary displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub record_count: usize,
    pub coordinate_count: usize,
    pub split_count: usize,
    pub pause_count: usize,
    /// Wall-clock time of the first record
    pub start_time: Option<DateTime<Utc>>,
    /// Final cumulative distance in meters
    pub total_distance: Option<f64>,
    /// First to last record, in seconds
    pub elapsed_seconds: Option<i64>,
    /// Paused seconds within the elapsed time
    pub paused_seconds: i64,
    /// Elapsed minus paused seconds
    pub moving_seconds: Option<i64>,
    pub avg_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u8>,
}

/// Immutable activity with lazily derived analytics
#[derive(Debug)]
pub struct Activity {
    data: ActivityData,
    config: AnalysisConfig,
    coordinates: OnceLock<Vec<Coordinate>>,
    paused: OnceLock<Vec<Interval>>,
    active: OnceLock<Vec<Interval>>,
    splits: OnceLock<Vec<Split>>,
    heart_rate: OnceLock<Vec<HeartRateDataPoint>>,
    heart_rate_runs: OnceLock<Vec<Vec<HeartRateDataPoint>>>,
}

impl Activity {
    /// Create an activity analyzed with the default configuration
    pub fn new(data: ActivityData) -> Self {
        Self::with_config(data, AnalysisConfig::default())
    }

    pub fn with_config(data: ActivityData, config: AnalysisConfig) -> Self {
        Self {
            data,
            config,
            coordinates: OnceLock::new(),
            paused: OnceLock::new(),
            active: OnceLock::new(),
            splits: OnceLock::new(),
            heart_rate: OnceLock::new(),
            heart_rate_runs: OnceLock::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.data.records
    }

    pub fn events(&self) -> &[Event] {
        &self.data.events
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Positions of every record carrying both latitude and longitude
    pub fn coordinates(&self) -> &[Coordinate] {
        self.coordinates.get_or_init(|| {
            let coordinates: Vec<Coordinate> =
                self.data.records.iter().filter_map(Record::coordinate).collect();
            debug!(count = coordinates.len(), "Extracted coordinates");
            coordinates
        })
    }

    /// Closed timer pauses, ordered and non-overlapping
    pub fn paused_intervals(&self) -> &[Interval] {
        self.paused.get_or_init(|| {
            let paused = ActiveIntervalBuilder::paused_intervals(
                &self.data.events,
                &self.data.records,
                self.config.open_pause,
            );
            debug!(count = paused.len(), "Computed paused intervals");
            paused
        })
    }

    /// Complement of the paused intervals within the activity's time span
    pub fn active_intervals(&self) -> &[Interval] {
        self.active.get_or_init(|| {
            ActiveIntervalBuilder::activity_span(&self.data.records, &self.data.events)
                .map(|span| ActiveIntervalBuilder::active_intervals(self.paused_intervals(), span))
                .unwrap_or_default()
        })
    }

    /// Fixed-distance splits in increasing id order
    pub fn splits(&self) -> &[Split] {
        self.splits.get_or_init(|| {
            SplitSegmenter::segment(&self.data.records, self.paused_intervals(), &self.config)
        })
    }

    /// Flat heart-rate series tagged with paused state
    pub fn heart_rate_series(&self) -> &[HeartRateDataPoint] {
        self.heart_rate.get_or_init(|| {
            let series = HeartRateBucketer::series(&self.data.records, self.paused_intervals());
            debug!(points = series.len(), "Built heart-rate series");
            series
        })
    }

    /// Heart-rate series grouped into runs split at pause boundaries
    pub fn heart_rate_runs(&self) -> &[Vec<HeartRateDataPoint>] {
        self.heart_rate_runs
            .get_or_init(|| HeartRateBucketer::runs(&self.data.records, self.paused_intervals()))
    }

    /// Stopped regions to shade on a heart-rate chart
    pub fn stopped_spans(&self, axis: ChartAxis) -> Vec<StoppedSpan> {
        heart_rate::stopped_spans(self.heart_rate_runs(), axis)
    }

    /// Compute every derived output, running independent passes in parallel
    pub fn warm_caches(&self) {
        self.paused_intervals();
        rayon::join(
            || {
                rayon::join(|| self.splits(), || self.coordinates());
            },
            || {
                rayon::join(
                    || self.heart_rate_series(),
                    || {
                        self.heart_rate_runs();
                        self.active_intervals();
                    },
                );
            },
        );
    }

    /// Whole-activity totals
    pub fn summary(&self) -> ActivitySummary {
        let records = &self.data.records;
        let first_time = records.iter().find_map(|r| r.timestamp);
        let last_time = records.iter().rev().find_map(|r| r.timestamp);

        let elapsed_seconds = first_time.zip(last_time).map(|(first, last)| last - first);
        let paused_seconds = first_time
            .zip(last_time)
            .map(|(first, last)| {
                ActiveIntervalBuilder::paused_overlap(self.paused_intervals(), first, last)
            })
            .unwrap_or(0);

        let heart_rates: Vec<u8> = records.iter().filter_map(|r| r.heart_rate).collect();
        let avg_heart_rate = (!heart_rates.is_empty()).then(|| {
            heart_rates.iter().map(|&hr| hr as u32).sum::<u32>() / heart_rates.len() as u32
        });

        ActivitySummary {
            record_count: records.len(),
            coordinate_count: self.coordinates().len(),
            split_count: self.splits().len(),
            pause_count: self.paused_intervals().len(),
            start_time: first_time.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            total_distance: records.iter().rev().find_map(|r| r.distance),
            elapsed_seconds,
            paused_seconds,
            moving_seconds: elapsed_seconds.map(|elapsed| elapsed - paused_seconds),
            avg_heart_rate,
            max_heart_rate: heart_rates.iter().copied().max(),
        }
    }
}

impl From<ActivityData> for Activity {
    fn from(data: ActivityData) -> Self {
        Self::new(data)
    }
}
