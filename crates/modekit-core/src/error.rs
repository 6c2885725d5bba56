//! Shared error taxonomy for validation failures
//!
//! Per-record conversion problems are not errors, they are diagnostics
//! (see [`crate::convert::SkippedRecord`]). `ValidationError` is reserved
//! for inputs that are rejected outright and never retried.

/// A structurally invalid input that is rejected immediately
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Slot index outside the writable range (slot 15 is factory-reserved)
    #[error("slot {0} out of writable range 0-14")]
    SlotOutOfRange(u8),

    /// Slot name cache must cover every writable slot
    #[error("slot name list must have exactly 15 entries, got {0}")]
    SlotNameCount(usize),

    /// Control identifier that no catalog entry matches
    #[error("unknown control identifier '{0}'")]
    UnknownControl(String),

    /// Mapping with an inverted value range
    #[error("control '{id}': min {min} greater than max {max}")]
    RangeInverted { id: String, min: u8, max: u8 },

    /// Mapping with a CC number above the MIDI limit
    #[error("control '{id}': CC {cc} out of range 0-127")]
    CcOutOfRange { id: String, cc: u8 },

    /// Mapping with a MIDI channel outside 1-16
    #[error("control '{id}': MIDI channel {channel} out of range 1-16")]
    ChannelOutOfRange { id: String, channel: u8 },

    /// Wire mode that is not a record collection at all
    #[error("wire mode is structurally invalid: {0}")]
    WireShape(String),
}
