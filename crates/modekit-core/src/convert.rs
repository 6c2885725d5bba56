//! Bidirectional mode conversion (wire mode ⇄ domain mode)
//!
//! The converter owns a priority-ordered list of [`WireScheme`] strategies.
//! Per-record problems never abort a conversion: a malformed record is
//! skipped and reported in the diagnostic list so the other 47 controls
//! still come through. The only fatal input is a wire mode that is not a
//! record collection at all.

use crate::catalog;
use crate::error::ValidationError;
use crate::mode::{ControlMapping, CustomMode, DEFAULT_MODE_NAME};
use crate::scheme::{ClassCcScheme, LegacyIdScheme, WireScheme};
use crate::wire;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Maximum mode name length accepted by the device.
///
/// The device library history carries both 8 and 16 here with no
/// authoritative statement of the hardware limit; 16 is the longer observed
/// value. Unconfirmed against real hardware; change in exactly one place.
pub const MODE_NAME_MAX_LEN: usize = 16;

/// Why a wire record (or domain entry) was left out of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Record is not an object at all
    NotAnObject,
    /// No scheme's structural test matched the record
    UnrecognizedScheme,
    /// A scheme claimed the record but its identifier resolved nowhere
    DecodeFailed { scheme: &'static str },
    /// Decoded identifier has no catalog entry
    UnknownControl { semantic_id: String },
    /// Domain entry with no identity in the target wire scheme
    NoWireIdentity { semantic_id: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record is not an object"),
            Self::UnrecognizedScheme => write!(f, "no wire scheme recognizes the record"),
            Self::DecodeFailed { scheme } => {
                write!(f, "scheme '{}' could not resolve the identifier", scheme)
            }
            Self::UnknownControl { semantic_id } => {
                write!(f, "control '{}' is not in the catalog", semantic_id)
            }
            Self::NoWireIdentity { semantic_id } => {
                write!(f, "control '{}' has no identity in the target scheme", semantic_id)
            }
        }
    }
}

/// Diagnostic for one skipped record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position in the normalized record sequence
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of a wire → domain conversion
///
/// `mode.controls` may be a strict subset of the 48 catalog controls;
/// callers complete it with [`CustomMode::merge_with_defaults`].
#[derive(Debug, Clone)]
pub struct WireImport {
    pub mode: CustomMode,
    pub skipped: Vec<SkippedRecord>,
}

/// Result of a domain → wire conversion
#[derive(Debug, Clone)]
pub struct WireExport {
    pub wire: Value,
    pub skipped: Vec<SkippedRecord>,
}

/// Encoding-agnostic mode converter
pub struct ModeConverter {
    /// Strategies in priority order; the first element is also the target
    /// encoding for `domain_to_wire`.
    schemes: Vec<Box<dyn WireScheme + Send + Sync>>,
}

impl Default for ModeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeConverter {
    /// Converter with the two known schemes, legacy id first
    pub fn new() -> Self {
        Self {
            schemes: vec![
                Box::new(LegacyIdScheme::new()),
                Box::new(ClassCcScheme::new()),
            ],
        }
    }

    /// Converter with an explicit scheme list (first = target encoding)
    pub fn with_schemes(schemes: Vec<Box<dyn WireScheme + Send + Sync>>) -> Self {
        Self { schemes }
    }

    /// Translate a wire mode into a (possibly partial) domain mode
    ///
    /// Unresolvable records are dropped with a diagnostic, never an error;
    /// a structurally invalid wire mode is the one fatal case.
    pub fn wire_to_domain(&self, wire_mode: &Value) -> Result<WireImport, ValidationError> {
        let records = wire::control_records(wire_mode)?;

        let mut controls = BTreeMap::new();
        let mut skipped = Vec::new();

        for (index, value) in records.iter().enumerate() {
            let Some(record) = value.as_object() else {
                skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::NotAnObject,
                });
                continue;
            };

            // First recognizing scheme handles the record exclusively.
            let Some(scheme) = self.schemes.iter().find(|s| s.recognize(record)) else {
                skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::UnrecognizedScheme,
                });
                continue;
            };

            let Some(decoded) = scheme.decode(record) else {
                skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::DecodeFailed {
                        scheme: scheme.name(),
                    },
                });
                continue;
            };

            // Class comes from the catalog, never from the record, so a
            // cross-scheme class/CC mismatch cannot leak into the domain.
            let Some(descriptor) = catalog::descriptor_for_id(&decoded.semantic_id) else {
                skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::UnknownControl {
                        semantic_id: decoded.semantic_id,
                    },
                });
                continue;
            };

            controls.insert(
                decoded.semantic_id.clone(),
                ControlMapping {
                    semantic_id: decoded.semantic_id,
                    class: descriptor.class,
                    cc_number: decoded.cc_number,
                    midi_channel: decoded.midi_channel,
                    min_value: decoded.min_value,
                    max_value: decoded.max_value,
                    // The wire format carries no authoritative label.
                    label: String::new(),
                },
            );
        }

        for skip in &skipped {
            log::debug!("Convert: skipped wire record {}: {}", skip.index, skip.reason);
        }

        let top = wire_mode.as_object();
        let name = top
            .and_then(|o| wire::read_string(o, &["name"]))
            .unwrap_or(DEFAULT_MODE_NAME)
            .to_string();
        let created_at = top
            .and_then(|o| wire::read_string(o, &["createdAt", "created_at"]))
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let mode = CustomMode {
            name,
            description: top
                .and_then(|o| wire::read_string(o, &["description"]))
                .unwrap_or_default()
                .to_string(),
            version: top
                .and_then(|o| wire::read_string(o, &["version"]))
                .unwrap_or("1.0.0")
                .to_string(),
            controls,
            created_at,
            modified_at: Utc::now(),
        };

        Ok(WireImport { mode, skipped })
    }

    /// Translate a domain mode into the target wire encoding
    ///
    /// Entries without an identity in the target scheme are skipped with a
    /// diagnostic, never fatally. The mode name is truncated to
    /// [`MODE_NAME_MAX_LEN`] characters.
    pub fn domain_to_wire(&self, mode: &CustomMode) -> WireExport {
        let target = self.schemes.first();

        let mut records = Vec::with_capacity(mode.controls.len());
        let mut skipped = Vec::new();

        for (index, mapping) in mode.controls.values().enumerate() {
            match target.and_then(|scheme| scheme.encode(mapping)) {
                Some(record) => records.push(record),
                None => skipped.push(SkippedRecord {
                    index,
                    reason: SkipReason::NoWireIdentity {
                        semantic_id: mapping.semantic_id.clone(),
                    },
                }),
            }
        }

        for skip in &skipped {
            log::debug!("Convert: skipped domain entry {}: {}", skip.index, skip.reason);
        }

        let name: String = mode.name.chars().take(MODE_NAME_MAX_LEN).collect();
        let wire = json!({
            "name": name,
            "controls": records,
        });

        WireExport { wire, skipped }
    }
}
