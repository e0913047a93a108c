//! Fixed-distance split segmentation
//!
//! Walks the ordered records and cuts a new split each time cumulative
//! distance crosses the next whole unit boundary. Each split's statistics
//! use moving time only: paused intervals overlapping the split are
//! subtracted before pace is computed.

use crate::config::{AnalysisConfig, ShortActivityPolicy};
use crate::intervals::ActiveIntervalBuilder;
use crate::models::{Interval, Record, Split, SplitDistance, FEET_PER_METER};
use tracing::{debug, trace, warn};

/// Statistics computed over one contiguous slice of records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitStatistics {
    /// Moving seconds per distance unit
    pub pace: Option<f64>,
    /// Integer-truncated mean heart rate
    pub avg_heart_rate: Option<u32>,
    /// Net elevation change in feet
    pub elevation_change: Option<i32>,
}

impl SplitStatistics {
    /// Compute pace, average heart rate and elevation change for `records`.
    ///
    /// `paused_seconds` is the paused time overlapping the slice and
    /// `start_altitude` the altitude carried over from the previous boundary.
    ///
    /// # Panics
    ///
    /// Panics if `records` is empty. The segmenter never produces an empty
    /// slice, so reaching this is a bug in the caller.
    pub fn compute(
        records: &[Record],
        paused_seconds: i64,
        start_altitude: Option<f64>,
        unit_length: f64,
    ) -> Self {
        assert!(!records.is_empty(), "split statistics requested for an empty record slice");

        Self {
            pace: Self::pace(records, paused_seconds, unit_length),
            avg_heart_rate: Self::average_heart_rate(records),
            elevation_change: Self::elevation_change(records, start_altitude),
        }
    }

    fn pace(records: &[Record], paused_seconds: i64, unit_length: f64) -> Option<f64> {
        let start_time = records.iter().find_map(|r| r.timestamp)?;
        let end_time = records.iter().rev().find_map(|r| r.timestamp)?;
        let start_distance = records.iter().find_map(|r| r.distance)?;
        let end_distance = records.iter().rev().find_map(|r| r.distance)?;

        let moving_seconds = (end_time - start_time) - paused_seconds;
        let moving_units = (end_distance - start_distance) / unit_length;

        if moving_units <= 0.0 || !moving_units.is_finite() {
            return None;
        }
        if moving_seconds <= 0 {
            warn!(
                start_time,
                end_time, paused_seconds, "Non-positive moving time for split, omitting pace"
            );
            return None;
        }

        Some(moving_seconds as f64 / moving_units)
    }

    fn average_heart_rate(records: &[Record]) -> Option<u32> {
        let (sum, count) = records
            .iter()
            .filter_map(|r| r.heart_rate)
            .fold((0u32, 0u32), |(sum, count), hr| (sum + hr as u32, count + 1));

        (count > 0).then(|| sum / count)
    }

    fn elevation_change(records: &[Record], start_altitude: Option<f64>) -> Option<i32> {
        let start = start_altitude?;
        let end = records.last()?.best_altitude()?;

        let change_feet = (end - start) * FEET_PER_METER;
        Some(change_feet.round() as i32)
    }
}

/// Splits an activity into fixed-distance segments
pub struct SplitSegmenter;

impl SplitSegmenter {
    /// Segment `records` into whole-unit splits plus an optional trailing
    /// partial split.
    ///
    /// A split closes on the first record whose distance reaches the next
    /// unit boundary; that record is shared as the first record of the
    /// following split. Records without a distance are skipped.
    pub fn segment(records: &[Record], paused: &[Interval], config: &AnalysisConfig) -> Vec<Split> {
        let unit_length = config.unit_length();
        if records.is_empty() || !(unit_length > 0.0) {
            return Vec::new();
        }

        let mut splits = Vec::new();
        let mut current_unit: u32 = 1;
        let mut slice_start = 0usize;
        let mut slice_start_altitude: Option<f64> = None;
        let mut last_boundary: Option<f64> = None;

        for (index, record) in records.iter().enumerate() {
            let Some(distance) = record.distance else {
                continue;
            };

            let target_distance = current_unit as f64 * unit_length;

            if distance >= target_distance {
                trace!(unit = current_unit, index, distance, "Crossed split boundary");

                splits.push(Self::build_split(
                    current_unit as usize,
                    SplitDistance::Whole(current_unit),
                    &records[slice_start..=index],
                    paused,
                    slice_start_altitude,
                    unit_length,
                ));

                last_boundary = Some(target_distance);
                current_unit += 1;
                slice_start = index;
                slice_start_altitude = record.best_altitude();
            }

            if slice_start_altitude.is_none() {
                slice_start_altitude = record.best_altitude();
            }
        }

        let last_index = records.len() - 1;
        let boundary = match (last_boundary, config.short_activity) {
            (Some(boundary), _) => Some(boundary),
            (None, ShortActivityPolicy::SinglePartial) => Some(0.0),
            (None, ShortActivityPolicy::NoSplits) => None,
        };
        // Trailing records without a distance add no progress past the boundary
        let final_distance = records[last_index].distance;

        if let (true, Some(boundary), Some(final_distance)) =
            (slice_start < last_index, boundary, final_distance)
        {
            let fraction = (final_distance - boundary) / unit_length;
            if fraction > 0.0 {
                splits.push(Self::build_split(
                    current_unit as usize,
                    SplitDistance::Partial(fraction),
                    &records[slice_start..=last_index],
                    paused,
                    slice_start_altitude,
                    unit_length,
                ));
            }
        }

        debug!(splits = splits.len(), records = records.len(), "Segmented activity into splits");
        splits
    }

    /// Shared constructor for whole and partial splits
    fn build_split(
        id: usize,
        distance: SplitDistance,
        slice: &[Record],
        paused: &[Interval],
        start_altitude: Option<f64>,
        unit_length: f64,
    ) -> Split {
        let start_time = slice.iter().find_map(|r| r.timestamp);
        let end_time = slice.iter().rev().find_map(|r| r.timestamp);
        let paused_seconds = match (start_time, end_time) {
            (Some(start), Some(end)) => ActiveIntervalBuilder::paused_overlap(paused, start, end),
            _ => 0,
        };

        let stats = SplitStatistics::compute(slice, paused_seconds, start_altitude, unit_length);

        Split {
            id,
            distance,
            pace_seconds_per_unit: stats.pace,
            avg_heart_rate: stats.avg_heart_rate,
            elevation_change: stats.elevation_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceUnit;

    fn config_with_unit(meters: f64) -> AnalysisConfig {
        AnalysisConfig {
            unit: DistanceUnit::Custom { meters },
            ..Default::default()
        }
    }

    /// Steady effort: one record every 10 s covering 25 m
    fn steady_run(count: i64) -> Vec<Record> {
        (0..count)
            .map(|i| Record {
                timestamp: Some(i * 10),
                distance: Some(i as f64 * 25.0),
                altitude: Some(100.0 + i as f64),
                heart_rate: Some(140 + (i % 5) as u8),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_empty_records_produce_no_splits() {
        let splits = SplitSegmenter::segment(&[], &[], &AnalysisConfig::default());
        assert!(splits.is_empty());
    }

    #[test]
    fn test_whole_and_partial_splits() {
        let records = steady_run(15); // 0..=350 m
        let splits = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));

        assert_eq!(splits.len(), 4);
        assert_eq!(
            splits.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(splits[0].distance, SplitDistance::Whole(1));
        assert_eq!(splits[2].distance, SplitDistance::Whole(3));
        assert_eq!(splits[3].distance, SplitDistance::Partial(0.5));

        for split in &splits {
            assert_eq!(split.pace_seconds_per_unit, Some(40.0));
        }
    }

    #[test]
    fn test_elevation_carries_boundary_altitude() {
        let records = steady_run(15);
        let splits = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));

        // Each whole split climbs 4 m between boundary records
        let four_meters_in_feet = (4.0 * FEET_PER_METER).round() as i32;
        assert_eq!(splits[0].elevation_change, Some(four_meters_in_feet));
        assert_eq!(splits[1].elevation_change, Some(four_meters_in_feet));
        assert_eq!(
            splits[3].elevation_change,
            Some((2.0 * FEET_PER_METER).round() as i32)
        );
    }

    #[test]
    fn test_paused_time_excluded_from_pace() {
        // Stopped between 50 s and 110 s with no distance progress
        let mut records = Vec::new();
        for i in 0..=5 {
            records.push(Record {
                timestamp: Some(i * 10),
                distance: Some(i as f64 * 25.0),
                ..Default::default()
            });
        }
        for i in 0..=3 {
            records.push(Record {
                timestamp: Some(110 + i * 10),
                distance: Some(125.0 + i as f64 * 25.0),
                ..Default::default()
            });
        }

        let paused = vec![Interval::new(50, 110).unwrap()];
        let splits = SplitSegmenter::segment(&records, &paused, &config_with_unit(100.0));

        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].pace_seconds_per_unit, Some(40.0));
        // Split 2 spans 40 s..140 s wall time, 60 s of it paused
        assert_eq!(splits[1].distance, SplitDistance::Whole(2));
        assert_eq!(splits[1].pace_seconds_per_unit, Some(40.0));

        let unpaused = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));
        assert_eq!(unpaused[1].pace_seconds_per_unit, Some(100.0));
    }

    #[test]
    fn test_records_without_distance_are_skipped() {
        let mut records = steady_run(9);
        records.insert(
            3,
            Record {
                timestamp: Some(25),
                heart_rate: Some(200),
                ..Default::default()
            },
        );
        let splits = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));

        assert_eq!(splits.len(), 2);
        assert!(splits[0].avg_heart_rate.unwrap() > 140);
    }

    #[test]
    fn test_short_activity_policies() {
        let records = steady_run(3); // 0..=50 m

        let none = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));
        assert!(none.is_empty());

        let config = AnalysisConfig {
            short_activity: ShortActivityPolicy::SinglePartial,
            ..config_with_unit(100.0)
        };
        let single = SplitSegmenter::segment(&records, &[], &config);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].id, 1);
        assert_eq!(single[0].distance, SplitDistance::Partial(0.5));
        assert_eq!(single[0].pace_seconds_per_unit, Some(40.0));
    }

    #[test]
    fn test_trailing_records_without_distance_emit_no_partial() {
        // Crosses 100 m at index 4 with 5 m of overshoot, then loses distance
        let mut records: Vec<Record> = (0..=4)
            .map(|i| Record {
                timestamp: Some(i * 10),
                distance: Some(i as f64 * 26.25),
                ..Default::default()
            })
            .collect();
        for i in 5..8 {
            records.push(Record {
                timestamp: Some(i * 10),
                heart_rate: Some(150),
                ..Default::default()
            });
        }

        let splits = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].distance, SplitDistance::Whole(1));

        let config = AnalysisConfig {
            short_activity: ShortActivityPolicy::SinglePartial,
            ..config_with_unit(1000.0)
        };
        assert!(SplitSegmenter::segment(&records, &[], &config).is_empty());
    }

    #[test]
    fn test_exact_boundary_ending_has_no_partial() {
        let records = steady_run(9); // ends exactly on 200 m
        let splits = SplitSegmenter::segment(&records, &[], &config_with_unit(100.0));
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|s| s.distance.is_whole()));
    }

    #[test]
    fn test_heart_rate_average_truncates() {
        let records = vec![
            Record { heart_rate: Some(150), ..Default::default() },
            Record { heart_rate: Some(151), ..Default::default() },
            Record::default(),
        ];
        let stats = SplitStatistics::compute(&records, 0, None, 100.0);
        assert_eq!(stats.avg_heart_rate, Some(150));
        assert_eq!(stats.pace, None);
        assert_eq!(stats.elevation_change, None);
    }

    #[test]
    fn test_pace_absent_for_zero_distance() {
        let records = vec![
            Record { timestamp: Some(0), distance: Some(500.0), ..Default::default() },
            Record { timestamp: Some(60), distance: Some(500.0), ..Default::default() },
        ];
        let stats = SplitStatistics::compute(&records, 0, None, 100.0);
        assert_eq!(stats.pace, None);
    }

    #[test]
    fn test_pace_absent_for_non_positive_moving_time() {
        let records = vec![
            Record { timestamp: Some(0), distance: Some(0.0), ..Default::default() },
            Record { timestamp: Some(60), distance: Some(100.0), ..Default::default() },
        ];
        assert_eq!(SplitStatistics::compute(&records, 60, None, 100.0).pace, None);
        assert_eq!(SplitStatistics::compute(&records, 90, None, 100.0).pace, None);

        let backwards = vec![
            Record { timestamp: Some(60), distance: Some(0.0), ..Default::default() },
            Record { timestamp: Some(0), distance: Some(100.0), ..Default::default() },
        ];
        assert_eq!(SplitStatistics::compute(&backwards, 0, None, 100.0).pace, None);
    }

    #[test]
    fn test_elevation_uses_enhanced_altitude_fallback() {
        let records = vec![
            Record { altitude: Some(100.0), ..Default::default() },
            Record { enhanced_altitude: Some(90.0), ..Default::default() },
        ];
        let stats = SplitStatistics::compute(&records, 0, Some(100.0), 100.0);
        assert_eq!(stats.elevation_change, Some(-33));

        let no_end = vec![Record { altitude: Some(100.0), ..Default::default() }, Record::default()];
        let stats = SplitStatistics::compute(&no_end, 0, Some(100.0), 100.0);
        assert_eq!(stats.elevation_change, None);
    }

    #[test]
    #[should_panic(expected = "empty record slice")]
    fn test_empty_slice_is_a_contract_violation() {
        SplitStatistics::compute(&[], 0, None, 100.0);
    }

    use proptest::prelude::*;

    fn noisy_run() -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(
            (1i64..30, 0.0f64..120.0, prop::option::of(90u8..200), prop::bool::weighted(0.9)),
            0..200,
        )
        .prop_map(|steps| {
            let mut ts = 0;
            let mut distance = 0.0;
            steps
                .into_iter()
                .map(|(dt, dd, hr, has_distance)| {
                    ts += dt;
                    distance += dd;
                    Record {
                        timestamp: Some(ts),
                        distance: has_distance.then_some(distance),
                        heart_rate: hr,
                        ..Default::default()
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_split_sequence_invariants(
            records in noisy_run(),
            pause_start in 0i64..3000,
            pause_len in 0i64..600,
        ) {
            let paused: Vec<Interval> = Interval::new(pause_start, pause_start + pause_len)
                .into_iter()
                .collect();
            let splits = SplitSegmenter::segment(&records, &paused, &config_with_unit(400.0));

            for (i, split) in splits.iter().enumerate() {
                prop_assert_eq!(split.id, i + 1);
                if i + 1 < splits.len() {
                    prop_assert!(split.distance.is_whole());
                }
                if let Some(pace) = split.pace_seconds_per_unit {
                    prop_assert!(pace > 0.0 && pace.is_finite());
                }
            }
        }
    }
}
