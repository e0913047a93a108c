//! FIT decoding into records and events
//!
//! Binary decoding is delegated to `fitparser`; this module only maps the
//! decoded `record` and `event` messages onto the crate's models. Enum fields
//! arrive either as profile strings (`"timer"`, `"stop_all"`) or as raw
//! profile numbers when the decoder has no name for them.

use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{FitError, Result};
use crate::import::ImportFormat;
use crate::models::{ActivityData, Event, EventKind, EventType, Record};

/// FIT file importer for Garmin native format
pub struct FitImporter;

impl FitImporter {
    pub fn new() -> Self {
        Self
    }

    /// Decode an in-memory FIT file
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ActivityData> {
        let messages = fitparser::from_bytes(bytes).map_err(|e| FitError::Corrupted {
            reason: e.to_string(),
        })?;
        activity_from_messages(&messages)
    }

    /// Decode a FIT stream
    pub fn import_reader<R: Read>(&self, reader: &mut R) -> Result<ActivityData> {
        let messages = fitparser::from_reader(reader).map_err(|e| FitError::Corrupted {
            reason: e.to_string(),
        })?;
        activity_from_messages(&messages)
    }
}

impl Default for FitImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for FitImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("fit"))
            .unwrap_or(false)
    }

    fn import_file(&self, file_path: &Path) -> Result<ActivityData> {
        if !file_path.exists() {
            return Err(FitError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let bytes = std::fs::read(file_path)?;
        let data = self.import_bytes(&bytes)?;

        info!(
            file = %file_path.display(),
            records = data.records.len(),
            events = data.events.len(),
            "Decoded FIT file"
        );
        Ok(data)
    }

    fn get_format_name(&self) -> &'static str {
        "FIT"
    }
}

/// Keep `record` and `event` messages, in file order
fn activity_from_messages(messages: &[FitDataRecord]) -> Result<ActivityData> {
    let mut records = Vec::new();
    let mut events = Vec::new();

    for message in messages {
        let fields = message.fields().iter().map(|f| (f.name(), f.value()));
        match message.kind() {
            MesgNum::Record => records.push(record_from_fields(fields)),
            MesgNum::Event => events.push(event_from_fields(fields)),
            _ => {}
        }
    }

    debug!(
        messages = messages.len(),
        records = records.len(),
        events = events.len(),
        "Mapped FIT messages"
    );

    if records.is_empty() {
        return Err(FitError::NoRecords.into());
    }
    Ok(ActivityData::new(records, events))
}

/// Build a record from the decoded fields of one `record` message
pub fn record_from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Value)>) -> Record {
    let mut record = Record::default();

    for (name, value) in fields {
        match name {
            "timestamp" => record.timestamp = fit_value_to_timestamp(value),
            "distance" => record.distance = fit_value_to_f64(value),
            "altitude" => record.altitude = fit_value_to_f64(value),
            "enhanced_altitude" => record.enhanced_altitude = fit_value_to_f64(value),
            "heart_rate" => {
                record.heart_rate = fit_value_to_f64(value).and_then(|bpm| u8::try_from(bpm as i64).ok())
            }
            "position_lat" => record.position_lat = fit_value_to_semicircles(value),
            "position_long" => record.position_long = fit_value_to_semicircles(value),
            _ => {}
        }
    }

    record
}

/// Build an event from the decoded fields of one `event` message
pub fn event_from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Value)>) -> Event {
    let mut event = Event {
        timestamp: None,
        kind: None,
        event_type: None,
    };

    for (name, value) in fields {
        match name {
            "timestamp" => event.timestamp = fit_value_to_timestamp(value),
            "event" => event.kind = event_kind(value),
            "event_type" => event.event_type = event_type(value),
            _ => {}
        }
    }

    event
}

fn event_kind(value: &Value) -> Option<EventKind> {
    match value {
        Value::String(name) if name == "timer" => Some(EventKind::Timer),
        Value::String(_) => Some(EventKind::Other),
        Value::Enum(0) => Some(EventKind::Timer),
        Value::Enum(_) => Some(EventKind::Other),
        _ => None,
    }
}

fn event_type(value: &Value) -> Option<EventType> {
    match value {
        Value::String(name) => Some(match name.as_str() {
            "start" => EventType::Start,
            "stop" => EventType::Stop,
            "stop_all" => EventType::StopAll,
            _ => EventType::Other,
        }),
        Value::Enum(number) => Some(match number {
            0 => EventType::Start,
            1 => EventType::Stop,
            4 => EventType::StopAll,
            _ => EventType::Other,
        }),
        _ => None,
    }
}

fn fit_value_to_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Timestamp(ts) => Some(ts.timestamp()),
        _ => None,
    }
}

fn fit_value_to_semicircles(value: &Value) -> Option<i32> {
    match value {
        Value::SInt32(v) => Some(*v),
        other => fit_value_to_f64(other).map(|v| v as i32),
    }
}

fn fit_value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::UInt8z(v) => Some(*v as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::UInt16z(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::UInt32z(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::UInt64z(v) => Some(*v as f64),
        Value::Array(values) => values.iter().find_map(fit_value_to_f64),
        _ => None,
    }
}
