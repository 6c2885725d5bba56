//! Domain model for custom modes
//!
//! A [`CustomMode`] is the editable aggregate: a named, versioned set of
//! control mappings keyed by semantic id. After the merge step it always
//! carries exactly one mapping per catalog control; partial modes only
//! exist transiently between wire conversion and merge.

use crate::catalog::{self, ControlClass, ControlDescriptor};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name used when a wire mode carries no usable name
pub const DEFAULT_MODE_NAME: &str = "New Custom Mode";

fn default_version() -> String {
    "1.0.0".to_string()
}

/// One control's editable configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMapping {
    /// Catalog identifier (`<class>-cc<N>`)
    pub semantic_id: String,
    /// Physical class, always taken from the catalog entry
    pub class: ControlClass,
    /// Assigned CC number (0-127, user-remappable)
    pub cc_number: u8,
    /// MIDI channel, 1-16
    pub midi_channel: u8,
    /// Lower bound of the emitted value range
    pub min_value: u8,
    /// Upper bound of the emitted value range
    pub max_value: u8,
    /// User-facing label; empty when the wire format carried none
    #[serde(default)]
    pub label: String,
}

impl ControlMapping {
    /// Build the default mapping for a catalog descriptor
    pub fn from_descriptor(d: &ControlDescriptor) -> Self {
        Self {
            semantic_id: d.semantic_id.to_string(),
            class: d.class,
            cc_number: d.cc_number,
            midi_channel: 1,
            min_value: 0,
            max_value: 127,
            label: d.default_label.to_string(),
        }
    }

    /// Validate invariants: known control, CC and channel in range, min <= max
    pub fn validate(&self) -> Result<(), ValidationError> {
        if catalog::descriptor_for_id(&self.semantic_id).is_none() {
            return Err(ValidationError::UnknownControl(self.semantic_id.clone()));
        }
        if self.cc_number > 127 {
            return Err(ValidationError::CcOutOfRange {
                id: self.semantic_id.clone(),
                cc: self.cc_number,
            });
        }
        if !(1..=16).contains(&self.midi_channel) {
            return Err(ValidationError::ChannelOutOfRange {
                id: self.semantic_id.clone(),
                channel: self.midi_channel,
            });
        }
        if self.min_value > self.max_value {
            return Err(ValidationError::RangeInverted {
                id: self.semantic_id.clone(),
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}

/// The editable root aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Mappings keyed by semantic id; complete (48 entries) after merge
    pub controls: BTreeMap<String, ControlMapping>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CustomMode {
    /// Fresh mode with the full factory default mapping set
    pub fn with_defaults(name: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            description: String::new(),
            version: default_version(),
            controls: catalog::default_mappings(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Complete the control set against catalog defaults
    ///
    /// Starts from the full default set and overwrites each entry present
    /// here, so the result always has exactly 48 controls no matter how
    /// partial this mode's set was. Entries whose id is not in the catalog
    /// are dropped.
    pub fn merge_with_defaults(&mut self) {
        let mut merged = catalog::default_mappings();
        for (id, mapping) in std::mem::take(&mut self.controls) {
            if merged.contains_key(&id) {
                merged.insert(id, mapping);
            } else {
                log::debug!("Mode: dropping non-catalog control '{}' during merge", id);
            }
        }
        self.controls = merged;
    }

    /// Record an edit by bumping the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// True once the mode carries one mapping per catalog control
    pub fn is_complete(&self) -> bool {
        self.controls.len() == catalog::all_descriptors().len()
            && catalog::all_descriptors()
                .iter()
                .all(|d| self.controls.contains_key(d.semantic_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_is_complete() {
        let mode = CustomMode::with_defaults("Init");
        assert!(mode.is_complete());
        assert_eq!(mode.version, "1.0.0");
    }

    #[test]
    fn test_merge_completes_partial_mode() {
        let mut mode = CustomMode::with_defaults("Partial");
        mode.controls.retain(|id, _| id == "fader-cc5");
        mode.controls.get_mut("fader-cc5").unwrap().midi_channel = 9;

        mode.merge_with_defaults();
        assert!(mode.is_complete());
        // Present entry kept, everything else back at defaults
        assert_eq!(mode.controls["fader-cc5"].midi_channel, 9);
        assert_eq!(mode.controls["fader-cc6"].midi_channel, 1);
    }

    #[test]
    fn test_merge_drops_foreign_ids() {
        let mut mode = CustomMode::with_defaults("Odd");
        mode.controls.insert(
            "pedal-cc99".to_string(),
            ControlMapping {
                semantic_id: "pedal-cc99".to_string(),
                class: ControlClass::Knob,
                cc_number: 99,
                midi_channel: 1,
                min_value: 0,
                max_value: 127,
                label: String::new(),
            },
        );
        mode.merge_with_defaults();
        assert!(mode.is_complete());
        assert!(!mode.controls.contains_key("pedal-cc99"));
    }

    #[test]
    fn test_mapping_validation() {
        let mut m = ControlMapping::from_descriptor(&crate::catalog::CATALOG[0]);
        assert!(m.validate().is_ok());

        m.midi_channel = 0;
        assert!(matches!(
            m.validate(),
            Err(ValidationError::ChannelOutOfRange { .. })
        ));

        m.midi_channel = 1;
        m.min_value = 100;
        m.max_value = 10;
        assert!(matches!(
            m.validate(),
            Err(ValidationError::RangeInverted { .. })
        ));

        m.min_value = 0;
        m.semantic_id = "nope".to_string();
        assert!(matches!(
            m.validate(),
            Err(ValidationError::UnknownControl(_))
        ));
    }
}
