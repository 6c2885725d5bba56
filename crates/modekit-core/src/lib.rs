//! Control catalog and mode conversion for a 48-control MIDI surface
//!
//! This crate is the device-independent half of the custom-mode editor:
//! - The canonical 48-control catalog (24 knobs, 8 faders, 16 buttons)
//!   with its identifier grammar and factory defaults
//! - The domain model (`CustomMode`, `ControlMapping`) and the
//!   merge-with-defaults completeness invariant
//! - Wire-format adapters for the two identification schemes observed
//!   across device library versions, behind one strategy contract
//! - The bidirectional converter with skip-and-report diagnostics
//!
//! # Architecture
//!
//! ```text
//! wire mode (JSON) → WireScheme recognize/decode → ModeConverter
//!                  → partial CustomMode → merge with catalog defaults
//! ```
//!
//! The stateful side (persistence, slot selection, device sync) lives in
//! `modekit-sync`.

mod catalog;
mod convert;
mod error;
mod mode;
mod scheme;
mod wire;

pub use catalog::{
    all_descriptors, default_mappings, descriptor_for_class_cc, descriptor_for_id,
    parse_identifier, ControlClass, ControlDescriptor, CATALOG,
};
pub use convert::{
    ModeConverter, SkipReason, SkippedRecord, WireExport, WireImport, MODE_NAME_MAX_LEN,
};
pub use error::ValidationError;
pub use mode::{ControlMapping, CustomMode, DEFAULT_MODE_NAME};
pub use scheme::{ClassCcScheme, DecodedControl, LegacyIdScheme, WireScheme, LEGACY_ID_BASE};
pub use wire::{control_records, WireRecord};
