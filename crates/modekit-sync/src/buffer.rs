//! Durable edit buffer
//!
//! The in-memory mode being edited is autosaved here so a reload resumes
//! where the user left off. Autosave must never interrupt editing: a
//! failed write is logged and dropped. A load only succeeds for a payload
//! that is recognizably a mode (non-empty name, object-typed controls);
//! anything else falls back to `None` and the caller rebuilds from catalog
//! defaults.

use crate::store::{KeyValueStore, StoreError};
use modekit_core::CustomMode;
use serde_json::Value;

const EDIT_BUFFER_KEY: &str = "modekit.edit_buffer";

/// Persisted copy of the in-memory edit buffer
pub struct EditBufferStore<S> {
    store: S,
}

impl<S: KeyValueStore> EditBufferStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Autosave the mode; failures are absorbed with a warning
    pub fn save(&self, mode: &CustomMode) {
        let json = match serde_json::to_string(mode) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("EditBuffer: failed to serialize mode '{}': {}", mode.name, e);
                return;
            }
        };
        if let Err(e) = self.store.set(EDIT_BUFFER_KEY, &json) {
            log::warn!("EditBuffer: autosave failed: {}", e);
        }
    }

    /// Restore the persisted mode, or `None` if there is nothing usable
    pub fn load(&self) -> Option<CustomMode> {
        let raw = self.store.get(EDIT_BUFFER_KEY)?;

        // Cheap shape gate before the typed parse: a usable payload has at
        // minimum a non-empty name and an object-typed controls field.
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("EditBuffer: corrupt persisted mode: {}", e);
                return None;
            }
        };
        let obj = value.as_object()?;
        if obj.get("name").and_then(Value::as_str).map_or(true, str::is_empty) {
            log::warn!("EditBuffer: persisted mode has no name, discarding");
            return None;
        }
        if !obj.get("controls").is_some_and(Value::is_object) {
            log::warn!("EditBuffer: persisted mode has no controls map, discarding");
            return None;
        }

        match serde_json::from_value::<CustomMode>(value) {
            Ok(mode) => Some(mode),
            Err(e) => {
                log::warn!("EditBuffer: persisted mode failed to parse: {}", e);
                None
            }
        }
    }

    /// Remove the persisted mode; explicit user action, so failures report
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(EDIT_BUFFER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store_pair() -> (MemoryStore, EditBufferStore<MemoryStore>) {
        let backing = MemoryStore::new();
        (backing.clone(), EditBufferStore::new(backing))
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_, buffer) = store_pair();
        let mut mode = CustomMode::with_defaults("Session");
        mode.controls.get_mut("fader-cc5").unwrap().midi_channel = 4;
        buffer.save(&mode);

        let restored = buffer.load().unwrap();
        assert_eq!(restored, mode);
    }

    #[test]
    fn test_load_empty_store() {
        let (_, buffer) = store_pair();
        assert!(buffer.load().is_none());
    }

    #[test]
    fn test_load_rejects_controls_missing() {
        let (backing, buffer) = store_pair();
        backing
            .set("modekit.edit_buffer", r#"{"name":"x"}"#)
            .unwrap();
        assert!(buffer.load().is_none());
    }

    #[test]
    fn test_load_rejects_bad_shapes() {
        let (backing, buffer) = store_pair();

        for payload in [
            "not json",
            "[1,2,3]",
            r#"{"name":"","controls":{}}"#,
            r#"{"name":42,"controls":{}}"#,
            r#"{"name":"x","controls":[1,2]}"#,
        ] {
            backing.set("modekit.edit_buffer", payload).unwrap();
            assert!(buffer.load().is_none(), "accepted: {}", payload);
        }
    }

    #[test]
    fn test_clear_removes_persisted_mode() {
        let (_, buffer) = store_pair();
        buffer.save(&CustomMode::with_defaults("Gone"));
        assert!(buffer.load().is_some());
        buffer.clear().unwrap();
        assert!(buffer.load().is_none());
    }
}
