//! Persistence and device synchronization for custom-mode editing
//!
//! This crate is the stateful half of the editor:
//! - A string key-value persistence contract with in-memory and
//!   file-backed implementations
//! - Durable slot selection and slot-name caching
//! - A durable edit buffer that survives restarts
//! - The sync engine driving fetch (device → merge → buffer) and send
//!   (buffer → device) against a slot-addressed device collaborator
//!
//! # Architecture
//!
//! ```text
//! UI → SyncEngine → ModeDevice (load/save) ⇄ ModeConverter (modekit-core)
//!                 → merged CustomMode → EditBufferStore → UI re-render
//! ```
//!
//! The engine enforces single-flight: one fetch or send at a time, with a
//! slot snapshot taken when the flow starts.

mod buffer;
mod engine;
mod slot;
mod store;

pub use buffer::EditBufferStore;
pub use engine::{DeviceError, ModeDevice, SyncEngine, SyncError, SyncPhase};
pub use slot::{validate_slot, SlotStateStore, MAX_SLOT, SLOT_COUNT};
pub use store::{default_store_path, FileStore, KeyValueStore, MemoryStore, StoreError};
