//! Cadena Rack - effect chains and their persistence
//!
//! This crate owns the two aggregate types the host talks to:
//!
//! - [`EffectsRack`] - a named, ordered, bounded chain of effects; the
//!   position in the chain is the signal-processing order.
//! - [`EffectsManager`] - a bounded collection of racks with one active
//!   rack, a deferred A/B switch slot, a global enable flag and pull-based
//!   error accumulation. The manager is the host's single entry point:
//!   the audio thread calls [`EffectsManager::process`], the control
//!   thread everything else, and a `parking_lot` mutex arbitrates
//!   structural edits. Parameter changes bypass the lock entirely through
//!   the atomic settings handles.
//!
//! Persistence is the binary "ROCK" (single rack) and "AXE!" (rack
//! collection) formats: little-endian, magic + version headers, hard caps
//! on names and counts, and positional parameter payloads whose order is
//! fixed by each effect's settings declaration.

pub mod error;
pub mod manager;
pub mod rack;
pub mod wire;

pub use error::RackError;
pub use manager::EffectsManager;
pub use rack::EffectsRack;
pub use wire::{MAX_EFFECTS_PER_RACK, MAX_NAME_BYTES, MAX_RACKS_IN_PRESET};
