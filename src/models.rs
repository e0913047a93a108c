use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Feet in one meter
pub const FEET_PER_METER: f64 = 3.28084;

/// Degrees per semicircle: 180 / 2^31
const DEGREES_PER_SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;

/// Convert a FIT semicircle value to degrees of latitude or longitude
pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    semicircles as f64 * DEGREES_PER_SEMICIRCLE
}

/// One sample point from the activity recording.
///
/// Every field is independently optional; a missing field means the device
/// wrote no data for it on this sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unix timestamp in seconds
    pub timestamp: Option<i64>,

    /// Cumulative distance in meters
    pub distance: Option<f64>,

    /// Altitude in meters
    pub altitude: Option<f64>,

    /// Enhanced (32-bit) altitude in meters
    pub enhanced_altitude: Option<f64>,

    /// Heart rate in beats per minute
    pub heart_rate: Option<u8>,

    /// Latitude in semicircles
    pub position_lat: Option<i32>,

    /// Longitude in semicircles
    pub position_long: Option<i32>,
}

impl Record {
    /// Altitude in meters, preferring the primary field over the enhanced one
    pub fn best_altitude(&self) -> Option<f64> {
        self.altitude.or(self.enhanced_altitude)
    }

    /// Position in degrees, present only when both halves of the pair are
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.position_lat, self.position_long) {
            (Some(lat), Some(long)) => Some(Coordinate {
                latitude: semicircles_to_degrees(lat),
                longitude: semicircles_to_degrees(long),
            }),
            _ => None,
        }
    }
}

/// Event kinds emitted by the recording device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Timer,
    Other,
}

/// Event types; only the timer transitions matter to the analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Start,
    Stop,
    StopAll,
    Other,
}

impl EventType {
    /// True for the types that pause the activity timer
    pub fn is_stop(&self) -> bool {
        matches!(self, EventType::Stop | EventType::StopAll)
    }
}

/// A discrete occurrence in the recording, sharing the record timestamp domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unix timestamp in seconds
    pub timestamp: Option<i64>,

    /// Event kind (timer, lap, ...)
    pub kind: Option<EventKind>,

    /// Event type (start, stop, ...)
    pub event_type: Option<EventType>,
}

impl Event {
    /// Convenience constructor for a fully specified timer event
    pub fn timer(timestamp: i64, event_type: EventType) -> Self {
        Self {
            timestamp: Some(timestamp),
            kind: Some(EventKind::Timer),
            event_type: Some(event_type),
        }
    }
}

/// Half-open time range `[start, end)` in seconds. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Build an interval, returning `None` for degenerate or inverted ranges
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Width of the interval in seconds
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `timestamp` falls inside the interval
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Seconds shared between this interval and `[start, end]`
    pub fn overlap(&self, start: i64, end: i64) -> i64 {
        (self.end.min(end) - self.start.max(start)).max(0)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Distance covered by a split, in configured distance units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SplitDistance {
    /// A completed unit, carrying the unit count
    Whole(u32),
    /// The trailing fractional remainder
    Partial(f64),
}

impl SplitDistance {
    pub fn is_whole(&self) -> bool {
        matches!(self, SplitDistance::Whole(_))
    }

    /// Numeric value used for sorting and charting
    pub fn value(&self) -> f64 {
        match self {
            SplitDistance::Whole(n) => *n as f64,
            SplitDistance::Partial(d) => *d,
        }
    }
}

impl fmt::Display for SplitDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitDistance::Whole(n) => write!(f, "{}", n),
            SplitDistance::Partial(d) => write!(f, "{}", two_significant_digits(*d)),
        }
    }
}

/// Render a fraction with at most two significant digits, trimming zeros
fn two_significant_digits(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (1 - magnitude).max(0) as usize;
    let rendered = format!("{:.*}", decimals, value);
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        rendered
    }
}

/// One fixed-distance segment of the activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Sequence number, starting at 1
    pub id: usize,

    /// Whole unit count or trailing fraction
    pub distance: SplitDistance,

    /// Moving seconds per distance unit
    pub pace_seconds_per_unit: Option<f64>,

    /// Integer-truncated mean heart rate
    pub avg_heart_rate: Option<u32>,

    /// Net elevation change in feet
    pub elevation_change: Option<i32>,
}

impl Split {
    /// Label for tables: `3` for whole splits, `0.13` for the remainder
    pub fn distance_label(&self) -> String {
        self.distance.to_string()
    }
}

/// One heart-rate sample for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateDataPoint {
    /// Unix timestamp in seconds
    pub timestamp: i64,

    /// Cumulative distance in meters, when the record carried one
    pub distance: Option<f64>,

    /// Heart rate in beats per minute
    pub heart_rate: u8,

    /// Whether the sample fell inside a paused interval
    pub is_stopped: bool,
}

/// Decoded activity: ordered records and events as produced by the decoder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub records: Vec<Record>,
    pub events: Vec<Event>,
}

impl ActivityData {
    pub fn new(records: Vec<Record>, events: Vec<Event>) -> Self {
        Self { records, events }
    }
}
