//! The top-level effects manager: racks, the active rack, persistence.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cadena_core::{EffectKind, SettingsBank};
use cadena_registry::EffectCatalog;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::RackError;
use crate::rack::EffectsRack;
use crate::wire::{self, COLLECTION_MAGIC, COLLECTION_VERSION, MAX_RACKS_IN_PRESET};

struct ManagerState {
    name: String,
    racks: Vec<EffectsRack>,
    active: Option<usize>,
    switch_to: Option<usize>,
    enabled: bool,
    errors: String,
    sample_rate: f32,
}

/// Owns every rack and routes the audio callback through the active one.
///
/// ## Threading
///
/// All methods take `&self`; share the manager between the audio and
/// control threads with an `Arc`. Structural edits (add/remove/reorder of
/// racks and effects, file I/O) and `process` contend on one internal
/// mutex - a structural edit can therefore briefly block the audio
/// thread, which is acceptable because edits are rare, UI-initiated
/// operations. Parameter changes never touch the mutex: grab an
/// [`effect_settings`](Self::effect_settings) handle once and write
/// atomically from then on.
///
/// ## Errors
///
/// Capacity rejections and file failures append to an internal error
/// string and return `false`; poll [`take_errors`](Self::take_errors)
/// after an operation. Nothing in `process` ever fails visibly.
pub struct EffectsManager {
    catalog: EffectCatalog,
    state: Mutex<ManagerState>,
}

impl EffectsManager {
    /// Create an empty manager.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            catalog: EffectCatalog::new(),
            state: Mutex::new(ManagerState {
                name: String::from("Default"),
                racks: Vec::new(),
                active: None,
                switch_to: None,
                enabled: true,
                errors: String::new(),
                sample_rate,
            }),
        }
    }

    /// The effect catalog used for construction and deserialization.
    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    // ---- audio path -----------------------------------------------------

    /// Process one interleaved block through the active rack.
    ///
    /// No-op when globally disabled or no rack is active.
    pub fn process(&self, buffer: &mut [f32], channels: usize) {
        let mut state = self.state.lock();
        if !state.enabled {
            return;
        }
        if let Some(index) = state.active {
            state.racks[index].process(buffer, channels);
        }
    }

    /// Update the sample rate for every rack, before the next `process`.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        let mut state = self.state.lock();
        state.sample_rate = sample_rate;
        for rack in &mut state.racks {
            rack.set_sample_rate(sample_rate);
        }
    }

    /// Seconds the active rack needs to ring out after input stops.
    pub fn tail_seconds(&self) -> f32 {
        let state = self.state.lock();
        state
            .active
            .map(|index| state.racks[index].tail_seconds())
            .unwrap_or(0.0)
    }

    // ---- global flags ---------------------------------------------------

    /// Whether processing is globally enabled.
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Enable or disable processing globally.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    /// Manager display name.
    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    /// Rename the manager.
    pub fn set_name(&self, name: impl Into<String>) {
        self.state.lock().name = name.into();
    }

    // ---- rack collection ------------------------------------------------

    /// Number of racks.
    pub fn rack_count(&self) -> usize {
        self.state.lock().racks.len()
    }

    /// Names of every rack, in order.
    pub fn rack_names(&self) -> Vec<String> {
        self.state
            .lock()
            .racks
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Add an empty rack. The first rack added becomes active.
    pub fn add_rack(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        if state.racks.len() >= MAX_RACKS_IN_PRESET {
            state
                .errors
                .push_str(&format!("cannot add rack '{name}': limit of {MAX_RACKS_IN_PRESET} reached\n"));
            return false;
        }
        let sample_rate = state.sample_rate;
        state.racks.push(EffectsRack::new(name, sample_rate));
        if state.active.is_none() {
            state.active = Some(state.racks.len() - 1);
        }
        true
    }

    /// Duplicate the rack at `index` (settings and flags, not DSP state).
    pub fn clone_rack(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if index >= state.racks.len() {
            state
                .errors
                .push_str(&format!("cannot clone rack {index}: no such rack\n"));
            return false;
        }
        if state.racks.len() >= MAX_RACKS_IN_PRESET {
            state
                .errors
                .push_str(&format!("cannot clone rack {index}: limit of {MAX_RACKS_IN_PRESET} reached\n"));
            return false;
        }
        let clone = state.racks[index].clone_rack(&self.catalog);
        state.racks.push(clone);
        true
    }

    /// Remove the rack at `index`.
    ///
    /// The active pointer can never dangle: removing the active rack
    /// falls back to the first remaining rack (or none at all), and
    /// indices past the removal point shift down with the collection.
    pub fn remove_rack(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if index >= state.racks.len() {
            state
                .errors
                .push_str(&format!("cannot remove rack {index}: no such rack\n"));
            return false;
        }
        state.racks.remove(index);

        state.active = match state.active {
            Some(active) if active == index => {
                if state.racks.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        state.switch_to = match state.switch_to {
            Some(switch) if switch == index => None,
            Some(switch) if switch > index => Some(switch - 1),
            other => other,
        };
        true
    }

    /// Move a rack to a new position (rotate semantics). Both the active
    /// and switch indices follow their racks.
    pub fn move_rack(&self, from: usize, to: usize) -> bool {
        let mut state = self.state.lock();
        if from >= state.racks.len() || to >= state.racks.len() {
            state
                .errors
                .push_str(&format!("cannot move rack {from} to {to}: out of range\n"));
            return false;
        }
        if from == to {
            return true;
        }
        let rack = state.racks.remove(from);
        state.racks.insert(to, rack);

        let follow = |index: usize| -> usize {
            if index == from {
                to
            } else if from < index && index <= to {
                index - 1
            } else if to <= index && index < from {
                index + 1
            } else {
                index
            }
        };
        state.active = state.active.map(follow);
        state.switch_to = state.switch_to.map(follow);
        true
    }

    /// Index of the active rack, or `None` when the collection is empty.
    pub fn active_rack_index(&self) -> Option<usize> {
        self.state.lock().active
    }

    /// Make the rack at `index` active.
    pub fn set_active_rack(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if index >= state.racks.len() {
            state
                .errors
                .push_str(&format!("cannot activate rack {index}: no such rack\n"));
            return false;
        }
        state.active = Some(index);
        true
    }

    /// Stage a rack index for [`switch_rack`](Self::switch_rack).
    pub fn set_switch_rack(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if index >= state.racks.len() {
            state
                .errors
                .push_str(&format!("cannot stage rack {index}: no such rack\n"));
            return false;
        }
        state.switch_to = Some(index);
        true
    }

    /// The currently staged switch index.
    pub fn switch_rack_index(&self) -> Option<usize> {
        self.state.lock().switch_to
    }

    /// A/B footswitch: swap the active rack with the staged one, so the
    /// next press swaps straight back.
    pub fn switch_rack(&self) -> bool {
        let mut state = self.state.lock();
        match (state.active, state.switch_to) {
            (Some(active), Some(staged)) if staged < state.racks.len() => {
                state.active = Some(staged);
                state.switch_to = Some(active);
                info!(from = active, to = staged, "rack switched");
                true
            }
            _ => {
                state.errors.push_str("cannot switch: no rack staged\n");
                false
            }
        }
    }

    // ---- active-rack effect editing -------------------------------------

    /// Append a new effect of `kind` to the active rack.
    pub fn add_effect(&self, kind: EffectKind) -> bool {
        let mut state = self.state.lock();
        let sample_rate = state.sample_rate;
        let Some(index) = state.active else {
            state.errors.push_str("cannot add effect: no active rack\n");
            return false;
        };
        let effect = self.catalog.create(kind, sample_rate);
        if !state.racks[index].add_effect(effect) {
            state
                .errors
                .push_str(&format!("cannot add {}: rack is full\n", kind.name()));
            return false;
        }
        true
    }

    /// Remove the effect at `index` from the active rack.
    pub fn remove_effect(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        let Some(rack) = state.active else {
            state.errors.push_str("cannot remove effect: no active rack\n");
            return false;
        };
        if state.racks[rack].remove_effect(index).is_none() {
            state
                .errors
                .push_str(&format!("cannot remove effect {index}: no such effect\n"));
            return false;
        }
        true
    }

    /// Reorder the active rack's chain (rotate semantics).
    pub fn move_effect(&self, from: usize, to: usize) -> bool {
        let mut state = self.state.lock();
        let Some(rack) = state.active else {
            state.errors.push_str("cannot move effect: no active rack\n");
            return false;
        };
        if !state.racks[rack].move_effect(from, to) {
            state
                .errors
                .push_str(&format!("cannot move effect {from} to {to}: out of range\n"));
            return false;
        }
        true
    }

    /// Enable or disable one effect in the active rack.
    pub fn set_effect_enabled(&self, index: usize, enabled: bool) -> bool {
        let mut state = self.state.lock();
        let Some(rack) = state.active else {
            return false;
        };
        match state.racks[rack].effect_mut(index) {
            Some(effect) => {
                effect.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Kinds and enable flags of the active rack's chain, in order.
    pub fn active_rack_effects(&self) -> Vec<(EffectKind, bool)> {
        let state = self.state.lock();
        state
            .active
            .map(|index| {
                state.racks[index]
                    .effects()
                    .map(|e| (e.kind(), e.is_enabled()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Shared settings handle for one effect in the active rack.
    ///
    /// The handle outlives the lock: hold it on the control thread and
    /// turn knobs without ever blocking audio.
    pub fn effect_settings(&self, index: usize) -> Option<Arc<dyn SettingsBank>> {
        let state = self.state.lock();
        let rack = state.active?;
        state.racks[rack].effect(index).map(|e| e.settings())
    }

    // ---- errors ---------------------------------------------------------

    /// Drain the accumulated error text. Empty when everything succeeded.
    pub fn take_errors(&self) -> String {
        std::mem::take(&mut self.state.lock().errors)
    }

    // ---- persistence ----------------------------------------------------

    /// Serialize the whole collection in the "AXE!" format.
    fn save_collection<W: Write>(&self, state: &ManagerState, writer: &mut W) -> Result<(), RackError> {
        writer.write_u32::<LittleEndian>(COLLECTION_MAGIC)?;
        writer.write_u32::<LittleEndian>(COLLECTION_VERSION)?;
        writer.write_i32::<LittleEndian>(state.racks.len() as i32)?;
        for rack in &state.racks {
            rack.save(writer)?;
        }
        // v2 field: staged switch index (-1 = none)
        let switch = state.switch_to.map_or(-1, |i| i as i32);
        writer.write_i32::<LittleEndian>(switch)?;
        // v3 field: manager name
        wire::write_string(writer, &state.name)?;
        Ok(())
    }

    /// Deserialize a collection, honoring fields by file version.
    fn load_collection<R: Read>(&self, state: &mut ManagerState, reader: &mut R) -> Result<(), RackError> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != COLLECTION_MAGIC {
            return Err(RackError::BadMagic {
                expected: COLLECTION_MAGIC,
                found: magic,
            });
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version == 0 || version > COLLECTION_VERSION {
            return Err(RackError::UnsupportedVersion {
                found: version,
                max: COLLECTION_VERSION,
            });
        }
        let count = reader.read_i32::<LittleEndian>()?;
        if count < 1 || count as usize > MAX_RACKS_IN_PRESET {
            return Err(RackError::BadRackCount {
                count,
                max: MAX_RACKS_IN_PRESET,
            });
        }

        let mut racks = Vec::with_capacity(count as usize);
        for _ in 0..count {
            racks.push(EffectsRack::load(reader, &self.catalog, state.sample_rate)?);
        }

        let switch_to = if version >= 2 {
            let staged = reader.read_i32::<LittleEndian>()?;
            usize::try_from(staged).ok().filter(|s| *s < racks.len())
        } else {
            None
        };
        let name = if version >= 3 {
            wire::read_string(reader)?
        } else {
            state.name.clone()
        };

        // Commit only after the whole file parsed
        state.racks = racks;
        state.active = Some(0);
        state.switch_to = switch_to;
        state.name = name;
        Ok(())
    }

    /// Save every rack to a collection file. Returns `false` and records
    /// the error on failure.
    pub fn save_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let state = self.state.lock();
        let result = std::fs::File::create(path)
            .map_err(RackError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                self.save_collection(&state, &mut writer)?;
                writer.flush()?;
                Ok(())
            });
        drop(state);

        match result {
            Ok(()) => {
                info!(path = %path.display(), "preset collection saved");
                true
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "preset save failed");
                self.state
                    .lock()
                    .errors
                    .push_str(&format!("save '{}' failed: {err}\n", path.display()));
                false
            }
        }
    }

    /// Replace the collection from a file. On failure the existing racks
    /// are untouched, the error recorded, and `false` returned.
    pub fn load_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mut state = self.state.lock();
        let result = std::fs::File::open(path)
            .map_err(RackError::from)
            .and_then(|file| {
                let mut reader = BufReader::new(file);
                self.load_collection(&mut state, &mut reader)
            });

        match result {
            Ok(()) => {
                info!(path = %path.display(), racks = state.racks.len(), "preset collection loaded");
                true
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "preset load failed");
                state
                    .errors
                    .push_str(&format!("load '{}' failed: {err}\n", path.display()));
                false
            }
        }
    }
}
