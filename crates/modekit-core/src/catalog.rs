//! The canonical 48-control catalog
//!
//! The surface has 24 knobs, 8 faders, and 16 buttons. Every other part of
//! the system (wire adapters, converter, default mappings, UI labels) keys
//! off this one table, so there is exactly one notion of "the 48 controls".
//!
//! Controls are identified by a semantic id of the form `<class>-cc<N>`
//! (e.g. `knob-cc13`). CC numbers live in fixed per-class bands:
//! knobs 13-20, 22-36 and 53; faders 5-12; buttons 37-52.

use crate::mode::ControlMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical control class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlClass {
    Knob,
    Fader,
    Button,
}

impl ControlClass {
    /// Stable lowercase name, used in semantic ids and wire type fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knob => "knob",
            Self::Fader => "fader",
            Self::Button => "button",
        }
    }

    /// Parse a class name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "knob" => Some(Self::Knob),
            "fader" => Some(Self::Fader),
            "button" => Some(Self::Button),
            _ => None,
        }
    }

    /// Check whether a CC number falls inside this class's reserved band
    pub fn band_contains(&self, cc: u8) -> bool {
        match self {
            Self::Knob => (13..=20).contains(&cc) || (22..=36).contains(&cc) || cc == 53,
            Self::Fader => (5..=12).contains(&cc),
            Self::Button => (37..=52).contains(&cc),
        }
    }
}

impl std::fmt::Display for ControlClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable catalog entry for one physical control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDescriptor {
    /// Stable semantic identifier, `<class>-cc<N>`
    pub semantic_id: &'static str,
    /// Factory CC number (inside the class band)
    pub cc_number: u8,
    /// Physical control class
    pub class: ControlClass,
    /// Positional label shown before the user renames the control
    pub default_label: &'static str,
}

impl ControlDescriptor {
    /// Render the canonical identifier string for this descriptor
    ///
    /// Always equal to `semantic_id`; kept as a function so the id format
    /// has exactly one formatting site next to its parsing site.
    pub fn identifier(&self) -> String {
        format!("{}-cc{}", self.class.as_str(), self.cc_number)
    }
}

const fn desc(
    semantic_id: &'static str,
    cc_number: u8,
    class: ControlClass,
    default_label: &'static str,
) -> ControlDescriptor {
    ControlDescriptor {
        semantic_id,
        cc_number,
        class,
        default_label,
    }
}

/// The full catalog in stable order: knobs 1-24, faders 1-8, buttons 1-16.
///
/// Knob CCs are not contiguous: the factory map skips CC 21 and 37-52
/// (taken by buttons), parking the last knob on CC 53.
pub const CATALOG: [ControlDescriptor; 48] = [
    // Knobs, rows top to bottom
    desc("knob-cc13", 13, ControlClass::Knob, "Knob 1"),
    desc("knob-cc14", 14, ControlClass::Knob, "Knob 2"),
    desc("knob-cc15", 15, ControlClass::Knob, "Knob 3"),
    desc("knob-cc16", 16, ControlClass::Knob, "Knob 4"),
    desc("knob-cc17", 17, ControlClass::Knob, "Knob 5"),
    desc("knob-cc18", 18, ControlClass::Knob, "Knob 6"),
    desc("knob-cc19", 19, ControlClass::Knob, "Knob 7"),
    desc("knob-cc20", 20, ControlClass::Knob, "Knob 8"),
    desc("knob-cc22", 22, ControlClass::Knob, "Knob 9"),
    desc("knob-cc23", 23, ControlClass::Knob, "Knob 10"),
    desc("knob-cc24", 24, ControlClass::Knob, "Knob 11"),
    desc("knob-cc25", 25, ControlClass::Knob, "Knob 12"),
    desc("knob-cc26", 26, ControlClass::Knob, "Knob 13"),
    desc("knob-cc27", 27, ControlClass::Knob, "Knob 14"),
    desc("knob-cc28", 28, ControlClass::Knob, "Knob 15"),
    desc("knob-cc29", 29, ControlClass::Knob, "Knob 16"),
    desc("knob-cc30", 30, ControlClass::Knob, "Knob 17"),
    desc("knob-cc31", 31, ControlClass::Knob, "Knob 18"),
    desc("knob-cc32", 32, ControlClass::Knob, "Knob 19"),
    desc("knob-cc33", 33, ControlClass::Knob, "Knob 20"),
    desc("knob-cc34", 34, ControlClass::Knob, "Knob 21"),
    desc("knob-cc35", 35, ControlClass::Knob, "Knob 22"),
    desc("knob-cc36", 36, ControlClass::Knob, "Knob 23"),
    desc("knob-cc53", 53, ControlClass::Knob, "Knob 24"),
    // Faders, left to right
    desc("fader-cc5", 5, ControlClass::Fader, "Fader 1"),
    desc("fader-cc6", 6, ControlClass::Fader, "Fader 2"),
    desc("fader-cc7", 7, ControlClass::Fader, "Fader 3"),
    desc("fader-cc8", 8, ControlClass::Fader, "Fader 4"),
    desc("fader-cc9", 9, ControlClass::Fader, "Fader 5"),
    desc("fader-cc10", 10, ControlClass::Fader, "Fader 6"),
    desc("fader-cc11", 11, ControlClass::Fader, "Fader 7"),
    desc("fader-cc12", 12, ControlClass::Fader, "Fader 8"),
    // Buttons, two rows of eight
    desc("button-cc37", 37, ControlClass::Button, "Button 1"),
    desc("button-cc38", 38, ControlClass::Button, "Button 2"),
    desc("button-cc39", 39, ControlClass::Button, "Button 3"),
    desc("button-cc40", 40, ControlClass::Button, "Button 4"),
    desc("button-cc41", 41, ControlClass::Button, "Button 5"),
    desc("button-cc42", 42, ControlClass::Button, "Button 6"),
    desc("button-cc43", 43, ControlClass::Button, "Button 7"),
    desc("button-cc44", 44, ControlClass::Button, "Button 8"),
    desc("button-cc45", 45, ControlClass::Button, "Button 9"),
    desc("button-cc46", 46, ControlClass::Button, "Button 10"),
    desc("button-cc47", 47, ControlClass::Button, "Button 11"),
    desc("button-cc48", 48, ControlClass::Button, "Button 12"),
    desc("button-cc49", 49, ControlClass::Button, "Button 13"),
    desc("button-cc50", 50, ControlClass::Button, "Button 14"),
    desc("button-cc51", 51, ControlClass::Button, "Button 15"),
    desc("button-cc52", 52, ControlClass::Button, "Button 16"),
];

/// All 48 descriptors in stable catalog order
pub fn all_descriptors() -> &'static [ControlDescriptor; 48] {
    &CATALOG
}

/// Find the descriptor for a semantic id
pub fn descriptor_for_id(semantic_id: &str) -> Option<&'static ControlDescriptor> {
    CATALOG.iter().find(|d| d.semantic_id == semantic_id)
}

/// Find the descriptor for a (class, CC) pair
pub fn descriptor_for_class_cc(class: ControlClass, cc: u8) -> Option<&'static ControlDescriptor> {
    CATALOG
        .iter()
        .find(|d| d.class == class && d.cc_number == cc)
}

/// Parse a `<class>-cc<N>` identifier string into its catalog descriptor
///
/// Returns `None` (never an error) if the class is unknown, `N` is not an
/// integer, `N` is outside 0-127, or `N` falls outside the reserved CC band
/// for that class.
pub fn parse_identifier(id: &str) -> Option<&'static ControlDescriptor> {
    let (class_part, cc_part) = id.split_once("-cc")?;
    let class = ControlClass::parse(class_part)?;
    let cc: u8 = cc_part.parse().ok().filter(|n| *n <= 127)?;
    if !class.band_contains(cc) {
        return None;
    }
    descriptor_for_class_cc(class, cc)
}

/// Build the complete default mapping set, one entry per catalog control
///
/// Defaults: channel 1, full 0-127 range, positional label.
pub fn default_mappings() -> BTreeMap<String, ControlMapping> {
    CATALOG
        .iter()
        .map(|d| (d.semantic_id.to_string(), ControlMapping::from_descriptor(d)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_counts() {
        assert_eq!(CATALOG.len(), 48);
        let knobs = CATALOG.iter().filter(|d| d.class == ControlClass::Knob).count();
        let faders = CATALOG.iter().filter(|d| d.class == ControlClass::Fader).count();
        let buttons = CATALOG.iter().filter(|d| d.class == ControlClass::Button).count();
        assert_eq!((knobs, faders, buttons), (24, 8, 16));
    }

    #[test]
    fn test_semantic_ids_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|d| d.semantic_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 48);
    }

    #[test]
    fn test_ccs_inside_class_bands() {
        for d in CATALOG.iter() {
            assert!(
                d.class.band_contains(d.cc_number),
                "{} outside band for {:?}",
                d.semantic_id,
                d.class
            );
        }
    }

    #[test]
    fn test_identifier_round_trip() {
        // parse(format(d)) == d for the whole catalog
        for d in CATALOG.iter() {
            assert_eq!(d.identifier(), d.semantic_id);
            let parsed = parse_identifier(&d.identifier()).unwrap();
            assert_eq!(parsed, d);
        }
    }

    #[test]
    fn test_parse_identifier_rejects_malformed() {
        assert!(parse_identifier("").is_none());
        assert!(parse_identifier("knob").is_none());
        assert!(parse_identifier("pedal-cc13").is_none());
        assert!(parse_identifier("knob-ccx").is_none());
        assert!(parse_identifier("knob-cc200").is_none());
        // Valid number, wrong band: 21 is the gap between the knob rows
        assert!(parse_identifier("knob-cc21").is_none());
        assert!(parse_identifier("fader-cc13").is_none());
        assert!(parse_identifier("button-cc5").is_none());
    }

    #[test]
    fn test_default_mappings_complete() {
        let defaults = default_mappings();
        assert_eq!(defaults.len(), 48);
        let knob1 = &defaults["knob-cc13"];
        assert_eq!(knob1.cc_number, 13);
        assert_eq!(knob1.midi_channel, 1);
        assert_eq!(knob1.min_value, 0);
        assert_eq!(knob1.max_value, 127);
        assert_eq!(knob1.label, "Knob 1");
    }
}
