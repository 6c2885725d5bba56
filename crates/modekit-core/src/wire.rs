//! Defensive readers for wire-side mode records
//!
//! Device libraries have shipped the same logical record under several
//! field spellings (`channel` vs `midiChannel`, `min` vs `minValue`, ...).
//! Nothing here trusts the input: every accessor probes a synonym list and
//! returns `Option` instead of failing on a missing or mistyped field.

use crate::error::ValidationError;
use serde_json::{Map, Value};

/// A single wire control record, shape unverified
pub type WireRecord = Map<String, Value>;

/// Field spellings for the numeric hardware control id (legacy scheme)
pub const ID_FIELDS: &[&str] = &["controlId", "control_id", "id"];

/// Field spellings for the control class (class+CC scheme)
pub const CLASS_FIELDS: &[&str] = &["type", "controlType", "control_type", "class"];

/// Field spellings for the CC number
pub const CC_FIELDS: &[&str] = &["cc", "ccNumber", "cc_number"];

/// Field spellings for the MIDI channel
pub const CHANNEL_FIELDS: &[&str] = &["channel", "midiChannel", "midi_channel"];

/// Field spellings for the range minimum
pub const MIN_FIELDS: &[&str] = &["min", "minValue", "min_value"];

/// Field spellings for the range maximum
pub const MAX_FIELDS: &[&str] = &["max", "maxValue", "max_value"];

/// Read the first present synonym as an unsigned integer
pub fn read_uint(record: &WireRecord, synonyms: &[&str]) -> Option<u64> {
    synonyms
        .iter()
        .find_map(|name| record.get(*name))
        .and_then(Value::as_u64)
}

/// Read the first present synonym as a 7-bit MIDI value (0-127)
pub fn read_midi_value(record: &WireRecord, synonyms: &[&str]) -> Option<u8> {
    read_uint(record, synonyms)
        .filter(|v| *v <= 127)
        .map(|v| v as u8)
}

/// Read the first present synonym as a non-empty string
pub fn read_string<'a>(record: &'a WireRecord, synonyms: &[&str]) -> Option<&'a str> {
    synonyms
        .iter()
        .find_map(|name| record.get(*name))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Normalize a wire mode's control collection to a record sequence
///
/// The collection has been observed both array-shaped and map-shaped
/// (keyed by arbitrary strings); either way the records come back in
/// source order / key order. A wire mode without a `controls` collection
/// at all is the one structurally fatal case.
pub fn control_records(wire: &Value) -> Result<Vec<&Value>, ValidationError> {
    let obj = wire
        .as_object()
        .ok_or_else(|| ValidationError::WireShape("wire mode is not an object".into()))?;
    match obj.get("controls") {
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(Value::Object(map)) => Ok(map.values().collect()),
        Some(other) => Err(ValidationError::WireShape(format!(
            "controls collection is {}, expected array or object",
            type_name(other)
        ))),
        None => Err(ValidationError::WireShape(
            "wire mode has no controls collection".into(),
        )),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
