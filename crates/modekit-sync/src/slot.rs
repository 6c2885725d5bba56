//! Active slot selection and slot-name cache
//!
//! The device has 15 writable mode slots (0-14); slot 15 is
//! factory-reserved and immutable, so writing it must be rejected up front
//! rather than forwarded. Slot selection is not safety-critical, so reads
//! absorb any storage corruption and fall back to slot 0.

use crate::store::KeyValueStore;
use modekit_core::ValidationError;

/// Number of writable slots on the device
pub const SLOT_COUNT: usize = 15;

/// Highest writable slot index
pub const MAX_SLOT: u8 = 14;

const ACTIVE_SLOT_KEY: &str = "modekit.active_slot";
const SLOT_NAMES_KEY: &str = "modekit.slot_names";

/// Reject slot indices outside the writable range
pub fn validate_slot(slot: u8) -> Result<u8, ValidationError> {
    if slot > MAX_SLOT {
        Err(ValidationError::SlotOutOfRange(slot))
    } else {
        Ok(slot)
    }
}

/// Persisted slot state: active slot index plus cached display names
pub struct SlotStateStore<S> {
    store: S,
}

impl<S: KeyValueStore> SlotStateStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist the active slot; rejects the reserved slot and beyond
    ///
    /// The range check lives here, not at the device boundary: a slot-15
    /// write reaching the hardware would clobber the factory slot.
    /// Storage failure is absorbed (the selection still applies in memory).
    pub fn save_active_slot(&self, slot: u8) -> Result<(), ValidationError> {
        validate_slot(slot)?;
        if let Err(e) = self.store.set(ACTIVE_SLOT_KEY, &slot.to_string()) {
            log::warn!("Slot: failed to persist active slot {}: {}", slot, e);
        }
        Ok(())
    }

    /// Read the persisted active slot; corruption degrades to slot 0
    pub fn load_active_slot(&self) -> u8 {
        self.store
            .get(ACTIVE_SLOT_KEY)
            .and_then(|raw| raw.trim().parse::<u8>().ok())
            .filter(|slot| *slot <= MAX_SLOT)
            .unwrap_or(0)
    }

    /// Cache the 15 slot display names read from the device
    pub fn save_slot_names(&self, names: &[String]) -> Result<(), ValidationError> {
        if names.len() != SLOT_COUNT {
            return Err(ValidationError::SlotNameCount(names.len()));
        }
        match serde_json::to_string(names) {
            Ok(json) => {
                if let Err(e) = self.store.set(SLOT_NAMES_KEY, &json) {
                    log::warn!("Slot: failed to persist slot names: {}", e);
                }
            }
            Err(e) => log::warn!("Slot: failed to serialize slot names: {}", e),
        }
        Ok(())
    }

    /// Read the cached slot names; `None` on any malformed data
    ///
    /// Never returns a partial list — a wrong-length array is treated the
    /// same as a corrupt one.
    pub fn load_slot_names(&self) -> Option<Vec<String>> {
        let raw = self.store.get(SLOT_NAMES_KEY)?;
        serde_json::from_str::<Vec<String>>(&raw)
            .ok()
            .filter(|names| names.len() == SLOT_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> SlotStateStore<MemoryStore> {
        SlotStateStore::new(MemoryStore::new())
    }

    #[test]
    fn test_active_slot_defaults_to_zero() {
        assert_eq!(store().load_active_slot(), 0);
    }

    #[test]
    fn test_active_slot_round_trip() {
        let slots = store();
        slots.save_active_slot(14).unwrap();
        assert_eq!(slots.load_active_slot(), 14);
    }

    #[test]
    fn test_reserved_slot_rejected() {
        let slots = store();
        assert_eq!(
            slots.save_active_slot(15),
            Err(ValidationError::SlotOutOfRange(15))
        );
        assert_eq!(
            slots.save_active_slot(200),
            Err(ValidationError::SlotOutOfRange(200))
        );
        // Nothing persisted by the rejected writes
        assert_eq!(slots.load_active_slot(), 0);
    }

    #[test]
    fn test_corrupt_active_slot_absorbed() {
        let backing = MemoryStore::new();
        let slots = SlotStateStore::new(backing.clone());

        backing.set("modekit.active_slot", "banana").unwrap();
        assert_eq!(slots.load_active_slot(), 0);

        backing.set("modekit.active_slot", "99").unwrap();
        assert_eq!(slots.load_active_slot(), 0);
    }

    #[test]
    fn test_slot_names_round_trip() {
        let slots = store();
        let names: Vec<String> = (0..15).map(|i| format!("Slot {}", i + 1)).collect();
        slots.save_slot_names(&names).unwrap();
        assert_eq!(slots.load_slot_names(), Some(names));
    }

    #[test]
    fn test_slot_names_wrong_length_rejected() {
        let slots = store();
        let short: Vec<String> = vec!["a".into(); 14];
        assert_eq!(
            slots.save_slot_names(&short),
            Err(ValidationError::SlotNameCount(14))
        );
    }

    #[test]
    fn test_slot_names_corrupt_reads_as_none() {
        let backing = MemoryStore::new();
        let slots = SlotStateStore::new(backing.clone());

        backing.set("modekit.slot_names", "not json").unwrap();
        assert_eq!(slots.load_slot_names(), None);

        // Valid JSON, wrong length: still no partial data
        backing.set("modekit.slot_names", "[\"a\",\"b\"]").unwrap();
        assert_eq!(slots.load_slot_names(), None);
    }
}
