//! Fetch/merge/apply and edit/send orchestration
//!
//! The engine owns the edit buffer and drives the two device flows:
//!
//! ```text
//! fetch: Idle → Fetching → Merging → Done | Error
//! send:  Idle → Sending → Done | Error
//! ```
//!
//! Both flows share the edit buffer, so only one may be in flight at a
//! time; a second call is rejected with [`SyncError::Busy`], never
//! interleaved or queued. The active slot is snapshotted when a flow
//! starts, so a selection change mid-flight does not retarget it. A failed
//! fetch leaves the existing edit buffer untouched; send never mutates
//! local state at all.

use crate::buffer::EditBufferStore;
use crate::slot::SlotStateStore;
use crate::store::{KeyValueStore, StoreError};
use modekit_core::{
    ControlMapping, CustomMode, ModeConverter, SkippedRecord, ValidationError, DEFAULT_MODE_NAME,
};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Failure reported by the device collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("device timed out")]
    Timeout,

    #[error("device disconnected")]
    Disconnected,

    #[error("device rejected the request: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// The slot-addressed device collaborator
///
/// Assumed atomic per call; timeout and retry policy belong to the
/// implementation behind this trait, not to the engine.
pub trait ModeDevice {
    /// Read the wire mode stored in a slot
    fn load_mode(&self, slot: u8) -> impl Future<Output = Result<Value, DeviceError>> + Send;

    /// Write a wire mode into a slot
    fn save_mode(
        &self,
        slot: u8,
        mode: &Value,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

/// Where the engine currently is in a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Merging,
    Sending,
    Done,
    Error,
}

/// Error surface of the engine's operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A fetch or send is already in flight
    #[error("another sync operation is already in flight")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Releases the single-flight flag when a flow ends, on any exit path
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The sync orchestrator: edit buffer owner and device flow driver
pub struct SyncEngine<D, S> {
    device: D,
    slots: SlotStateStore<S>,
    buffer: EditBufferStore<S>,
    converter: ModeConverter,
    edit_buffer: RwLock<CustomMode>,
    phase: RwLock<SyncPhase>,
    in_flight: AtomicBool,
    last_skipped: RwLock<Vec<SkippedRecord>>,
}

impl<D, S> SyncEngine<D, S>
where
    D: ModeDevice,
    S: KeyValueStore + Clone,
{
    /// Build an engine over a device and a persistence backend
    ///
    /// Restores the persisted edit buffer when one exists (completing it
    /// against catalog defaults in case it predates a catalog change),
    /// otherwise starts from the factory default mode.
    pub fn new(device: D, store: S) -> Self {
        let slots = SlotStateStore::new(store.clone());
        let buffer = EditBufferStore::new(store);

        let initial = match buffer.load() {
            Some(mut mode) => {
                mode.merge_with_defaults();
                log::info!("Sync: restored edit buffer '{}'", mode.name);
                mode
            }
            None => {
                log::info!("Sync: no persisted edit buffer, starting from defaults");
                CustomMode::with_defaults(DEFAULT_MODE_NAME)
            }
        };

        Self {
            device,
            slots,
            buffer,
            converter: ModeConverter::new(),
            edit_buffer: RwLock::new(initial),
            phase: RwLock::new(SyncPhase::Idle),
            in_flight: AtomicBool::new(false),
            last_skipped: RwLock::new(Vec::new()),
        }
    }

    fn acquire(&self) -> Result<FlightGuard<'_>, SyncError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            log::debug!("Sync: operation rejected, another is in flight");
            return Err(SyncError::Busy);
        }
        Ok(FlightGuard {
            flag: &self.in_flight,
        })
    }

    fn set_phase(&self, phase: SyncPhase) {
        if let Ok(mut current) = self.phase.write() {
            *current = phase;
        }
        log::debug!("Sync: phase -> {:?}", phase);
    }

    /// Current flow phase (for UI display)
    pub fn phase(&self) -> SyncPhase {
        self.phase.read().map(|p| *p).unwrap_or(SyncPhase::Idle)
    }

    /// Snapshot of the current edit buffer
    pub fn current_mode(&self) -> CustomMode {
        self.edit_buffer
            .read()
            .map(|mode| mode.clone())
            .unwrap_or_else(|_| CustomMode::with_defaults(DEFAULT_MODE_NAME))
    }

    /// Diagnostics from the most recent fetch conversion
    pub fn last_skipped(&self) -> Vec<SkippedRecord> {
        self.last_skipped
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Persist a new active slot selection
    pub fn select_slot(&self, slot: u8) -> Result<(), ValidationError> {
        self.slots.save_active_slot(slot)
    }

    /// The persisted active slot (0 when unset)
    pub fn active_slot(&self) -> u8 {
        self.slots.load_active_slot()
    }

    /// Fetch the mode from the active slot into the edit buffer
    ///
    /// Converts the wire mode, merges against catalog defaults so the
    /// buffer always ends up with exactly 48 controls, commits, and
    /// autosaves. On device failure the existing buffer is untouched.
    pub async fn fetch(&self) -> Result<(), SyncError> {
        let _guard = self.acquire()?;
        // Immutable snapshot: the slot read here is the one used for the
        // whole flow, regardless of selection changes mid-flight.
        let slot = self.slots.load_active_slot();

        self.set_phase(SyncPhase::Fetching);
        log::info!("Sync: fetching mode from slot {}", slot);

        let wire = match self.device.load_mode(slot).await {
            Ok(wire) => wire,
            Err(e) => {
                log::warn!("Sync: fetch from slot {} failed: {}", slot, e);
                self.set_phase(SyncPhase::Error);
                return Err(e.into());
            }
        };

        self.set_phase(SyncPhase::Merging);
        let import = match self.converter.wire_to_domain(&wire) {
            Ok(import) => import,
            Err(e) => {
                log::warn!("Sync: slot {} returned an invalid wire mode: {}", slot, e);
                self.set_phase(SyncPhase::Error);
                return Err(e.into());
            }
        };
        if !import.skipped.is_empty() {
            log::warn!(
                "Sync: {} wire record(s) skipped while fetching slot {}",
                import.skipped.len(),
                slot
            );
        }

        let mut mode = import.mode;
        mode.merge_with_defaults();

        if let Ok(mut buffer) = self.edit_buffer.write() {
            *buffer = mode.clone();
        }
        self.buffer.save(&mode);
        if let Ok(mut last) = self.last_skipped.write() {
            *last = import.skipped;
        }

        self.set_phase(SyncPhase::Done);
        log::info!("Sync: slot {} loaded into edit buffer as '{}'", slot, mode.name);
        Ok(())
    }

    /// Send the current edit buffer to the active slot
    ///
    /// Read-only with respect to local state: the buffer is never mutated
    /// by a send attempt, successful or not.
    pub async fn send(&self) -> Result<(), SyncError> {
        let _guard = self.acquire()?;
        let slot = self.slots.load_active_slot();

        self.set_phase(SyncPhase::Sending);
        let mode = self.current_mode();
        log::info!("Sync: sending '{}' to slot {}", mode.name, slot);

        let export = self.converter.domain_to_wire(&mode);
        if !export.skipped.is_empty() {
            log::warn!(
                "Sync: {} control(s) had no wire identity and were not sent",
                export.skipped.len()
            );
        }

        match self.device.save_mode(slot, &export.wire).await {
            Ok(()) => {
                self.set_phase(SyncPhase::Done);
                Ok(())
            }
            Err(e) => {
                log::warn!("Sync: send to slot {} failed: {}", slot, e);
                self.set_phase(SyncPhase::Error);
                Err(e.into())
            }
        }
    }

    /// Replace the edit buffer with factory defaults
    ///
    /// Clears the persisted buffer (reported, since this is an explicit
    /// user action) and leaves slot state alone.
    pub fn reset(&self) -> Result<(), SyncError> {
        if self.in_flight.load(Ordering::Acquire) {
            return Err(SyncError::Busy);
        }

        let fresh = CustomMode::with_defaults(DEFAULT_MODE_NAME);
        if let Ok(mut buffer) = self.edit_buffer.write() {
            *buffer = fresh;
        }
        self.set_phase(SyncPhase::Idle);
        self.buffer.clear()?;
        log::info!("Sync: edit buffer reset to defaults");
        Ok(())
    }

    /// Apply one control edit to the buffer and autosave
    pub fn set_control(&self, mapping: ControlMapping) -> Result<(), ValidationError> {
        mapping.validate()?;

        let snapshot = match self.edit_buffer.write() {
            Ok(mut buffer) => {
                buffer
                    .controls
                    .insert(mapping.semantic_id.clone(), mapping);
                buffer.touch();
                Some(buffer.clone())
            }
            Err(_) => None,
        };
        if let Some(mode) = snapshot {
            self.buffer.save(&mode);
        }
        Ok(())
    }

    /// Rename the mode in the buffer and autosave
    pub fn rename(&self, name: &str) {
        let snapshot = match self.edit_buffer.write() {
            Ok(mut buffer) => {
                buffer.name = name.to_string();
                buffer.touch();
                Some(buffer.clone())
            }
            Err(_) => None,
        };
        if let Some(mode) = snapshot {
            self.buffer.save(&mode);
        }
    }

    /// Access the slot state store (slot-name cache reads/writes)
    pub fn slot_state(&self) -> &SlotStateStore<S> {
        &self.slots
    }
}
