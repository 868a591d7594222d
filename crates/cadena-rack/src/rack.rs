//! An ordered, bounded chain of effects.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cadena_core::Effect;
use cadena_registry::EffectCatalog;
use tracing::{debug, info};

use crate::error::RackError;
use crate::wire::{
    self, MAX_EFFECTS_PER_RACK, RACK_MAGIC, RACK_VERSION,
};

/// A named, ordered chain of owned effects.
///
/// Position 0 processes first; the chain order is the signal order.
/// The chain is bounded at [`MAX_EFFECTS_PER_RACK`] - the same limit the
/// wire format enforces on load.
pub struct EffectsRack {
    name: String,
    effects: Vec<Box<dyn Effect>>,
    sample_rate: f32,
}

impl EffectsRack {
    /// Create an empty rack.
    pub fn new(name: impl Into<String>, sample_rate: f32) -> Self {
        Self {
            name: name.into(),
            effects: Vec::new(),
            sample_rate,
        }
    }

    /// Rack display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the rack.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of effects in the chain.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// The sample rate the rack's effects currently run at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Append an effect to the end of the chain.
    ///
    /// Returns `false` (dropping nothing, adding nothing) when the rack is
    /// already at capacity.
    pub fn add_effect(&mut self, mut effect: Box<dyn Effect>) -> bool {
        if self.effects.len() >= MAX_EFFECTS_PER_RACK {
            return false;
        }
        effect.set_sample_rate(self.sample_rate);
        self.effects.push(effect);
        true
    }

    /// Remove and return the effect at `index`.
    pub fn remove_effect(&mut self, index: usize) -> Option<Box<dyn Effect>> {
        if index < self.effects.len() {
            Some(self.effects.remove(index))
        } else {
            None
        }
    }

    /// Move an effect to a new position, preserving the relative order of
    /// everything else (a rotate, not a swap).
    pub fn move_effect(&mut self, from: usize, to: usize) -> bool {
        if from >= self.effects.len() || to >= self.effects.len() {
            return false;
        }
        if from != to {
            let effect = self.effects.remove(from);
            self.effects.insert(to, effect);
        }
        true
    }

    /// Borrow the effect at `index`.
    pub fn effect(&self, index: usize) -> Option<&dyn Effect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    /// Mutably borrow the effect at `index`.
    pub fn effect_mut(&mut self, index: usize) -> Option<&mut Box<dyn Effect>> {
        self.effects.get_mut(index)
    }

    /// Iterate the chain in processing order.
    pub fn effects(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Process an interleaved buffer through the chain in order.
    ///
    /// Each effect applies its own enable/bypass fast path.
    pub fn process(&mut self, buffer: &mut [f32], channels: usize) {
        for effect in &mut self.effects {
            effect.process(buffer, channels);
        }
    }

    /// Propagate a sample-rate change to every effect.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for effect in &mut self.effects {
            effect.set_sample_rate(sample_rate);
        }
    }

    /// Clear the runtime state of every effect.
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Seconds until the whole chain decays to silence - the sum of the
    /// enabled effects' tails, since tails feed into later effects.
    pub fn tail_seconds(&self) -> f32 {
        self.effects
            .iter()
            .filter(|e| e.is_enabled())
            .map(|e| e.tail_seconds())
            .sum()
    }

    /// Value-clone the rack: same name, same effect kinds in the same
    /// order, same parameter values and enable flags. Runtime DSP state
    /// (delay lines, filter histories) is deliberately not cloned - it
    /// reinitializes on the first `process` call.
    pub fn clone_rack(&self, catalog: &EffectCatalog) -> EffectsRack {
        let mut clone = EffectsRack::new(self.name.clone(), self.sample_rate);
        for effect in &self.effects {
            let mut copy = catalog.create(effect.kind(), self.sample_rate);
            copy.settings().apply(&effect.settings().snapshot());
            copy.set_enabled(effect.is_enabled());
            clone.effects.push(copy);
        }
        clone
    }

    /// Serialize the rack: magic, version, name, effect count, effects.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), RackError> {
        writer.write_u32::<LittleEndian>(RACK_MAGIC)?;
        writer.write_u32::<LittleEndian>(RACK_VERSION)?;
        wire::write_string(writer, &self.name)?;
        writer.write_u32::<LittleEndian>(self.effects.len() as u32)?;
        for effect in &self.effects {
            wire::write_effect(writer, effect.as_ref())?;
        }
        Ok(())
    }

    /// Deserialize a rack. Rejects bad magic, newer versions, unknown
    /// effect tags and any count above [`MAX_EFFECTS_PER_RACK`].
    pub fn load<R: Read>(
        reader: &mut R,
        catalog: &EffectCatalog,
        sample_rate: f32,
    ) -> Result<EffectsRack, RackError> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != RACK_MAGIC {
            return Err(RackError::BadMagic {
                expected: RACK_MAGIC,
                found: magic,
            });
        }
        let version = reader.read_u32::<LittleEndian>()?;
        if version == 0 || version > RACK_VERSION {
            return Err(RackError::UnsupportedVersion {
                found: version,
                max: RACK_VERSION,
            });
        }
        let name = wire::read_string(reader)?;
        let count = reader.read_u32::<LittleEndian>()?;
        if count as usize > MAX_EFFECTS_PER_RACK {
            return Err(RackError::TooManyEffects {
                count,
                max: MAX_EFFECTS_PER_RACK as u32,
            });
        }

        let mut rack = EffectsRack::new(name, sample_rate);
        for _ in 0..count {
            rack.effects
                .push(wire::read_effect(reader, catalog, sample_rate)?);
        }
        debug!(rack = %rack.name, effects = rack.len(), "rack loaded");
        Ok(rack)
    }

    /// Save to a file on disk.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), RackError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        info!(rack = %self.name, path = %path.display(), "rack saved");
        Ok(())
    }

    /// Load from a file on disk. Trailing bytes after the payload are an
    /// error - a rack file contains exactly one rack.
    pub fn load_file(
        path: impl AsRef<Path>,
        catalog: &EffectCatalog,
        sample_rate: f32,
    ) -> Result<EffectsRack, RackError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(std::fs::File::open(path)?);
        let rack = Self::load(&mut reader, catalog, sample_rate)?;
        wire::expect_eof(&mut reader)?;
        info!(rack = %rack.name, path = %path.display(), "rack loaded from file");
        Ok(rack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadena_core::{EffectKind, ParamValue};
    use std::io::Cursor;

    fn catalog() -> EffectCatalog {
        EffectCatalog::new()
    }

    fn demo_rack() -> EffectsRack {
        let catalog = catalog();
        let mut rack = EffectsRack::new("Demo", 48000.0);
        for kind in [
            EffectKind::Preamp,
            EffectKind::Distortion,
            EffectKind::Chorus,
            EffectKind::Delay,
        ] {
            assert!(rack.add_effect(catalog.create(kind, 48000.0)));
        }
        rack
    }

    #[test]
    fn capacity_is_enforced() {
        let catalog = catalog();
        let mut rack = EffectsRack::new("Full", 48000.0);
        for _ in 0..MAX_EFFECTS_PER_RACK {
            assert!(rack.add_effect(catalog.create(EffectKind::Preamp, 48000.0)));
        }
        assert!(!rack.add_effect(catalog.create(EffectKind::Preamp, 48000.0)));
        assert_eq!(rack.len(), MAX_EFFECTS_PER_RACK);
    }

    #[test]
    fn move_effect_rotates() {
        let mut rack = demo_rack();
        // [Preamp, Distortion, Chorus, Delay] -> move 0 to 2
        assert!(rack.move_effect(0, 2));
        let kinds: Vec<_> = rack.effects().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            [
                EffectKind::Distortion,
                EffectKind::Chorus,
                EffectKind::Preamp,
                EffectKind::Delay
            ]
        );
        assert!(!rack.move_effect(0, 10));
    }

    #[test]
    fn serialization_roundtrip() {
        let catalog = catalog();
        let mut rack = demo_rack();
        // Perturb some parameters and flags
        rack.effect_mut(1).unwrap().settings().params()[0].set_value(ParamValue::Float(33.0));
        rack.effect_mut(2).unwrap().set_enabled(false);

        let mut buffer = Vec::new();
        rack.save(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer);
        let restored = EffectsRack::load(&mut cursor, &catalog, 48000.0).unwrap();

        assert_eq!(restored.name(), "Demo");
        assert_eq!(restored.len(), rack.len());
        for (a, b) in rack.effects().zip(restored.effects()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.is_enabled(), b.is_enabled());
            assert!(a.settings().matches(&b.settings().snapshot()));
        }
    }

    #[test]
    fn load_rejects_garbage_magic() {
        let catalog = catalog();
        let mut cursor = Cursor::new(vec![0u8; 64]);
        assert!(matches!(
            EffectsRack::load(&mut cursor, &catalog, 48000.0),
            Err(RackError::BadMagic { .. })
        ));
    }

    #[test]
    fn load_rejects_future_version() {
        let catalog = catalog();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&RACK_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&99u32.to_le_bytes());
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            EffectsRack::load(&mut cursor, &catalog, 48000.0),
            Err(RackError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn load_rejects_oversized_effect_count() {
        let catalog = catalog();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&RACK_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&RACK_VERSION.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // empty name
        bytes.extend_from_slice(&1000u32.to_le_bytes()); // absurd count
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(
            EffectsRack::load(&mut cursor, &catalog, 48000.0),
            Err(RackError::TooManyEffects { count: 1000, .. })
        ));
    }

    #[test]
    fn clone_copies_settings_not_state() {
        let catalog = catalog();
        let mut rack = demo_rack();
        rack.effect_mut(3).unwrap().settings().params()[0].set_value(ParamValue::Float(750.0));

        // Run audio through the original so it accumulates delay state
        let mut buffer = vec![0.5f32; 4096];
        rack.process(&mut buffer, 2);

        let mut clone = rack.clone_rack(&catalog);
        assert_eq!(clone.name(), rack.name());
        assert_eq!(clone.len(), rack.len());
        assert_eq!(
            clone.effect(3).unwrap().settings().params()[0].value(),
            ParamValue::Float(750.0)
        );

        // The clone starts silent: processing zeros yields zeros (no tail
        // carried over from the original's delay lines)
        let mut silence = vec![0.0f32; 4096];
        clone.process(&mut silence, 2);
        assert!(silence.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn file_roundtrip_with_eof_check() {
        let catalog = catalog();
        let rack = demo_rack();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.rack");

        rack.save_file(&path).unwrap();
        let restored = EffectsRack::load_file(&path, &catalog, 48000.0).unwrap();
        assert_eq!(restored.len(), 4);

        // Appending junk makes the file invalid
        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xAB]).unwrap();
        drop(file);
        assert!(matches!(
            EffectsRack::load_file(&path, &catalog, 48000.0),
            Err(RackError::TrailingBytes)
        ));
    }

    #[test]
    fn tail_sums_enabled_effects() {
        let catalog = catalog();
        let mut rack = EffectsRack::new("Tails", 48000.0);
        rack.add_effect(catalog.create(EffectKind::Delay, 48000.0));
        rack.add_effect(catalog.create(EffectKind::Preamp, 48000.0));
        let with_delay = rack.tail_seconds();
        assert!(with_delay > 0.0);

        rack.effect_mut(0).unwrap().set_enabled(false);
        assert_eq!(rack.tail_seconds(), 0.0);
    }
}
