//! Wire encoding strategies
//!
//! Two control-identification schemes have coexisted across device library
//! versions: an older one keyed by a numeric hardware control id, and a
//! newer one keyed by a (class, CC) pair. Each lives behind the common
//! [`WireScheme`] contract so the converter stays encoding-agnostic and a
//! third scheme is a pure addition.
//!
//! Lookup tables are owned by the scheme instances and built once from the
//! catalog at construction, not kept as free-floating module state.

use crate::catalog::{self, ControlClass};
use crate::mode::ControlMapping;
use crate::wire::{
    self, WireRecord, CC_FIELDS, CHANNEL_FIELDS, CLASS_FIELDS, ID_FIELDS, MAX_FIELDS, MIN_FIELDS,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// First hardware control id; ids run contiguously in catalog order
pub const LEGACY_ID_BASE: u32 = 0x10;

/// A wire record resolved to domain terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedControl {
    pub semantic_id: String,
    pub cc_number: u8,
    pub midi_channel: u8,
    pub min_value: u8,
    pub max_value: u8,
}

/// One wire encoding strategy
///
/// `recognize` is a cheap structural test; the converter uses the first
/// scheme that recognizes a record exclusively for that record. Schemes are
/// never mixed within a single record.
pub trait WireScheme {
    /// Short name for diagnostics and logs
    fn name(&self) -> &'static str;

    /// Cheap structural test: does this record use our identification scheme?
    fn recognize(&self, record: &WireRecord) -> bool;

    /// Decode a recognized record; `None` if its identifier resolves nowhere
    fn decode(&self, record: &WireRecord) -> Option<DecodedControl>;

    /// Encode a domain mapping; `None` if the control has no identity here
    fn encode(&self, mapping: &ControlMapping) -> Option<Value>;
}

/// Legacy scheme: records identified by a numeric hardware control id
///
/// The id table assigns `LEGACY_ID_BASE + catalog index` to each control.
/// This scheme's channel field is 0-indexed on the wire; interop testing
/// showed a `+1` normalization is required, so it is applied here (and only
/// here) symmetrically in both directions.
pub struct LegacyIdScheme {
    id_to_semantic: HashMap<u32, &'static str>,
    semantic_to_id: HashMap<&'static str, u32>,
}

impl LegacyIdScheme {
    pub fn new() -> Self {
        let mut id_to_semantic = HashMap::new();
        let mut semantic_to_id = HashMap::new();
        for (index, d) in catalog::all_descriptors().iter().enumerate() {
            let id = LEGACY_ID_BASE + index as u32;
            id_to_semantic.insert(id, d.semantic_id);
            semantic_to_id.insert(d.semantic_id, id);
        }
        Self {
            id_to_semantic,
            semantic_to_id,
        }
    }

    /// The hardware id for a semantic id, if the control is in the table
    pub fn hardware_id(&self, semantic_id: &str) -> Option<u32> {
        self.semantic_to_id.get(semantic_id).copied()
    }
}

impl Default for LegacyIdScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl WireScheme for LegacyIdScheme {
    fn name(&self) -> &'static str {
        "legacy-id"
    }

    fn recognize(&self, record: &WireRecord) -> bool {
        wire::read_uint(record, ID_FIELDS).is_some()
    }

    fn decode(&self, record: &WireRecord) -> Option<DecodedControl> {
        let id = wire::read_uint(record, ID_FIELDS)?;
        let semantic_id = *self.id_to_semantic.get(&(u32::try_from(id).ok()?))?;
        let descriptor = catalog::descriptor_for_id(semantic_id)?;

        // Records usually repeat the CC; fall back to the factory CC when
        // the id alone was sent.
        let cc_number =
            wire::read_midi_value(record, CC_FIELDS).unwrap_or(descriptor.cc_number);

        // 0-indexed on the wire; out-of-range values are treated as absent.
        let midi_channel = wire::read_uint(record, CHANNEL_FIELDS)
            .filter(|raw| *raw <= 15)
            .map(|raw| raw as u8 + 1)
            .unwrap_or(1);

        Some(DecodedControl {
            semantic_id: semantic_id.to_string(),
            cc_number,
            midi_channel,
            min_value: wire::read_midi_value(record, MIN_FIELDS).unwrap_or(0),
            max_value: wire::read_midi_value(record, MAX_FIELDS).unwrap_or(127),
        })
    }

    fn encode(&self, mapping: &ControlMapping) -> Option<Value> {
        let id = self.hardware_id(&mapping.semantic_id)?;
        Some(json!({
            "controlId": id,
            "cc": mapping.cc_number,
            "channel": mapping.midi_channel.saturating_sub(1),
            "min": mapping.min_value,
            "max": mapping.max_value,
        }))
    }
}

/// Newer scheme: records identified by a (class, CC) pair
///
/// The pair table is the catalog inverted. Unlike the legacy scheme, this
/// encoding's channel field is already 1-indexed, so no correction is
/// applied.
pub struct ClassCcScheme {
    pair_to_semantic: HashMap<(ControlClass, u8), &'static str>,
}

impl ClassCcScheme {
    pub fn new() -> Self {
        let pair_to_semantic = catalog::all_descriptors()
            .iter()
            .map(|d| ((d.class, d.cc_number), d.semantic_id))
            .collect();
        Self { pair_to_semantic }
    }
}

impl Default for ClassCcScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl WireScheme for ClassCcScheme {
    fn name(&self) -> &'static str {
        "class-cc"
    }

    fn recognize(&self, record: &WireRecord) -> bool {
        wire::read_string(record, CLASS_FIELDS)
            .and_then(ControlClass::parse)
            .is_some()
            && wire::read_midi_value(record, CC_FIELDS).is_some()
    }

    fn decode(&self, record: &WireRecord) -> Option<DecodedControl> {
        let class = wire::read_string(record, CLASS_FIELDS).and_then(ControlClass::parse)?;
        let cc_number = wire::read_midi_value(record, CC_FIELDS)?;
        let semantic_id = *self.pair_to_semantic.get(&(class, cc_number))?;

        let midi_channel = wire::read_uint(record, CHANNEL_FIELDS)
            .filter(|ch| (1..=16).contains(ch))
            .map(|ch| ch as u8)
            .unwrap_or(1);

        Some(DecodedControl {
            semantic_id: semantic_id.to_string(),
            cc_number,
            midi_channel,
            min_value: wire::read_midi_value(record, MIN_FIELDS).unwrap_or(0),
            max_value: wire::read_midi_value(record, MAX_FIELDS).unwrap_or(127),
        })
    }

    fn encode(&self, mapping: &ControlMapping) -> Option<Value> {
        // Identity here *is* the (class, CC) pair, so a remapped CC encodes
        // under its new number and only round-trips while the pair stays in
        // the catalog table.
        Some(json!({
            "type": mapping.class.as_str(),
            "cc": mapping.cc_number,
            "channel": mapping.midi_channel,
            "min": mapping.min_value,
            "max": mapping.max_value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(v: Value) -> WireRecord {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_legacy_recognize_and_decode() {
        let scheme = LegacyIdScheme::new();
        let record = rec(json!({ "controlId": 0x10, "channel": 0, "min": 5, "max": 100 }));
        assert!(scheme.recognize(&record));

        let decoded = scheme.decode(&record).unwrap();
        assert_eq!(decoded.semantic_id, "knob-cc13");
        assert_eq!(decoded.cc_number, 13);
        // 0-indexed wire channel 0 becomes domain channel 1
        assert_eq!(decoded.midi_channel, 1);
        assert_eq!((decoded.min_value, decoded.max_value), (5, 100));
    }

    #[test]
    fn test_legacy_unknown_id() {
        let scheme = LegacyIdScheme::new();
        let record = rec(json!({ "controlId": 9999 }));
        assert!(scheme.recognize(&record));
        assert!(scheme.decode(&record).is_none());
    }

    #[test]
    fn test_legacy_defaults_when_fields_absent() {
        let scheme = LegacyIdScheme::new();
        // Last catalog entry: button 16
        let record = rec(json!({ "id": 0x10 + 47 }));
        let decoded = scheme.decode(&record).unwrap();
        assert_eq!(decoded.semantic_id, "button-cc52");
        assert_eq!(decoded.cc_number, 52);
        assert_eq!(decoded.midi_channel, 1);
        assert_eq!((decoded.min_value, decoded.max_value), (0, 127));
    }

    #[test]
    fn test_legacy_round_trip_applies_channel_offset_symmetrically() {
        let scheme = LegacyIdScheme::new();
        let mut mapping = ControlMapping::from_descriptor(&catalog::CATALOG[30]);
        mapping.midi_channel = 10;
        mapping.min_value = 20;
        mapping.max_value = 90;

        let encoded = rec(scheme.encode(&mapping).unwrap());
        assert_eq!(encoded["channel"], json!(9));

        let decoded = scheme.decode(&encoded).unwrap();
        assert_eq!(decoded.semantic_id, mapping.semantic_id);
        assert_eq!(decoded.midi_channel, 10);
        assert_eq!((decoded.min_value, decoded.max_value), (20, 90));
    }

    #[test]
    fn test_class_cc_recognize_and_decode() {
        let scheme = ClassCcScheme::new();
        let record = rec(json!({ "type": "fader", "cc": 5, "channel": 3 }));
        assert!(scheme.recognize(&record));

        let decoded = scheme.decode(&record).unwrap();
        assert_eq!(decoded.semantic_id, "fader-cc5");
        // 1-indexed already: no offset
        assert_eq!(decoded.midi_channel, 3);
    }

    #[test]
    fn test_class_cc_does_not_recognize_legacy_records() {
        let scheme = ClassCcScheme::new();
        assert!(!scheme.recognize(&rec(json!({ "controlId": 0x10 }))));
        // Class without a CC is not enough either
        assert!(!scheme.recognize(&rec(json!({ "type": "knob" }))));
    }

    #[test]
    fn test_class_cc_unknown_pair() {
        let scheme = ClassCcScheme::new();
        // CC 21 sits in the gap between knob rows
        let record = rec(json!({ "type": "knob", "cc": 21 }));
        assert!(scheme.recognize(&record));
        assert!(scheme.decode(&record).is_none());
    }

    #[test]
    fn test_legacy_table_covers_catalog() {
        let scheme = LegacyIdScheme::new();
        for d in catalog::all_descriptors() {
            assert!(scheme.hardware_id(d.semantic_id).is_some());
        }
    }
}
