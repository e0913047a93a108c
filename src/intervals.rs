//! Timer pause detection
//!
//! Scans timer start/stop events and derives the paused intervals of an
//! activity, the active complement, and how much paused time a record range
//! spans. All functions are pure over the event and record slices.

use crate::config::OpenPausePolicy;
use crate::models::{Event, EventKind, EventType, Interval, Record};
use tracing::{debug, warn};

/// Builds paused and active intervals from timer events
pub struct ActiveIntervalBuilder;

/// A pause that has been opened but not yet closed by a `start` event
#[derive(Debug, Clone, Copy)]
struct PendingPause {
    start: i64,
    /// False for the implicit pause at the beginning of the recording
    explicit: bool,
}

impl ActiveIntervalBuilder {
    /// Compute the ordered, non-overlapping paused intervals.
    ///
    /// The recording starts paused at the first event's timestamp. A `stop`
    /// or `stop_all` timer event (re)opens a pause, a `start` closes it.
    /// Pauses still open at the end are dropped unless `policy` closes an
    /// explicitly stopped one at the final record's timestamp.
    pub fn paused_intervals(
        events: &[Event],
        records: &[Record],
        policy: OpenPausePolicy,
    ) -> Vec<Interval> {
        let mut intervals = Vec::new();
        let mut pending = events
            .iter()
            .find_map(|e| e.timestamp)
            .map(|start| PendingPause { start, explicit: false });

        for event in events {
            if event.kind != Some(EventKind::Timer) {
                continue;
            }

            let (timestamp, event_type) = match (event.timestamp, event.event_type) {
                (Some(ts), Some(et)) => (ts, et),
                _ => {
                    warn!(?event, "Skipping malformed timer event");
                    continue;
                }
            };

            if event_type.is_stop() {
                pending = Some(PendingPause { start: timestamp, explicit: true });
            } else if event_type == EventType::Start {
                if let Some(pause) = pending.take() {
                    intervals.extend(Interval::new(pause.start, timestamp));
                }
            }
        }

        if let Some(pause) = pending {
            match policy {
                OpenPausePolicy::CloseAtLastRecord if pause.explicit => {
                    let last_record = records.iter().rev().find_map(|r| r.timestamp);
                    if let Some(end) = last_record {
                        intervals.extend(Interval::new(pause.start, end));
                    }
                }
                _ => debug!(start = pause.start, "Dropping pause still open at end of recording"),
            }
        }

        merge_overlapping(intervals)
    }

    /// Complement of `paused` within `span`, in chronological order
    pub fn active_intervals(paused: &[Interval], span: Interval) -> Vec<Interval> {
        let mut active = Vec::new();
        let mut cursor = span.start;

        for pause in paused {
            if pause.end <= span.start || pause.start >= span.end {
                continue;
            }
            active.extend(Interval::new(cursor, pause.start.min(span.end)));
            cursor = cursor.max(pause.end);
        }

        active.extend(Interval::new(cursor, span.end));
        active
    }

    /// Total paused seconds overlapping the closed time range `[start, end]`
    pub fn paused_overlap(paused: &[Interval], start: i64, end: i64) -> i64 {
        paused.iter().map(|interval| interval.overlap(start, end)).sum()
    }

    /// Whether `timestamp` falls inside any paused interval
    pub fn is_paused(paused: &[Interval], timestamp: i64) -> bool {
        let index = paused.partition_point(|interval| interval.end <= timestamp);
        paused.get(index).is_some_and(|interval| interval.contains(timestamp))
    }

    /// Overall time range covered by the records and events
    pub fn activity_span(records: &[Record], events: &[Event]) -> Option<Interval> {
        let timestamps = records
            .iter()
            .map(|r| r.timestamp)
            .chain(events.iter().map(|e| e.timestamp))
            .flatten();

        let (min, max) = timestamps.fold(None, |acc: Option<(i64, i64)>, ts| match acc {
            Some((min, max)) => Some((min.min(ts), max.max(ts))),
            None => Some((ts, ts)),
        })?;

        Interval::new(min, max)
    }
}

/// Sort and coalesce overlapping intervals so that no instant is covered
/// twice. Intervals that only touch stay separate: each keeps its own timer
/// boundary.
fn merge_overlapping(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|interval| interval.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start < last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}
