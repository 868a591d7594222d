//! Effect catalog and factory for cadena audio effects.
//!
//! The catalog is the one place that knows how to turn an [`EffectKind`]
//! tag into a live effect instance. Deserialization, rack cloning and UI
//! effect menus all construct through here, so the closed type set stays
//! closed: adding an effect means adding a variant, a descriptor and a
//! constructor arm, and the compiler points out anything missed.
//!
//! # Example
//!
//! ```rust
//! use cadena_registry::EffectCatalog;
//! use cadena_core::{Effect, EffectKind};
//!
//! let catalog = EffectCatalog::new();
//! let mut chorus = catalog.create(EffectKind::Chorus, 48000.0);
//! let mut buffer = vec![0.0f32; 128];
//! chorus.process(&mut buffer, 2);
//! ```

use cadena_analysis::SpectrumAnalyzer;
use cadena_core::{Effect, EffectKind};
use cadena_drums::{Cymbal, HiHat, KickDrum, SnareDrum, TomDrum};
use cadena_effects::{
    AutoWah, Bitcrusher, Chorus, Compressor, Delay, Distortion, Equalizer, Flanger, Limiter,
    LoFi, NoiseGate, Overdrive, Phaser, Preamp, Reverb, RingModulator, Tone, Tremolo,
    VoiceModulator, Warmth,
};

/// Category of audio effect for menu grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Gain stages and utility processors.
    Utility,
    /// Distortion, saturation and degradation.
    Distortion,
    /// Filters and equalizers.
    Filter,
    /// Chorus, flanger, phaser, tremolo, ring/pitch modulation.
    Modulation,
    /// Delay and reverb.
    TimeBased,
    /// Compressors, limiters and gates.
    Dynamics,
    /// Meters and analyzers.
    Analysis,
    /// Synthesized drum voices.
    Drums,
}

impl EffectCategory {
    /// Human-readable category name.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Utility => "Utility",
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Filter => "Filter",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Dynamics => "Dynamics",
            EffectCategory::Analysis => "Analysis",
            EffectCategory::Drums => "Drums",
        }
    }
}

/// Catalog entry describing one effect kind.
#[derive(Debug, Clone, Copy)]
pub struct EffectDescriptor {
    /// The stable type tag.
    pub kind: EffectKind,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Menu category.
    pub category: EffectCategory,
}

/// The complete effect catalog.
///
/// Stateless; the descriptor table is compiled in and `create` dispatches
/// over the closed [`EffectKind`] set.
#[derive(Debug, Default)]
pub struct EffectCatalog;

const DESCRIPTORS: [EffectDescriptor; 26] = [
    EffectDescriptor {
        kind: EffectKind::Preamp,
        name: "Preamp",
        description: "High-headroom clean gain stage",
        category: EffectCategory::Utility,
    },
    EffectDescriptor {
        kind: EffectKind::Distortion,
        name: "Distortion",
        description: "Cubic-polynomial waveshaping distortion",
        category: EffectCategory::Distortion,
    },
    EffectDescriptor {
        kind: EffectKind::Overdrive,
        name: "Overdrive",
        description: "Tanh saturation with tone control",
        category: EffectCategory::Distortion,
    },
    EffectDescriptor {
        kind: EffectKind::Warmth,
        name: "Warmth",
        description: "Four-pole analog-style HF rolloff",
        category: EffectCategory::Filter,
    },
    EffectDescriptor {
        kind: EffectKind::LoFi,
        name: "Lo-Fi",
        description: "Consumer sound-card emulation",
        category: EffectCategory::Distortion,
    },
    EffectDescriptor {
        kind: EffectKind::Bitcrusher,
        name: "Bitcrusher",
        description: "Bit-depth and sample-rate crusher",
        category: EffectCategory::Distortion,
    },
    EffectDescriptor {
        kind: EffectKind::Equalizer,
        name: "Equalizer",
        description: "Nine-band graphic equalizer",
        category: EffectCategory::Filter,
    },
    EffectDescriptor {
        kind: EffectKind::Tone,
        name: "Tone",
        description: "Bass/mid/treble tone stack",
        category: EffectCategory::Filter,
    },
    EffectDescriptor {
        kind: EffectKind::Chorus,
        name: "Chorus",
        description: "Modulated-delay chorus",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::Flanger,
        name: "Flanger",
        description: "Swept comb with feedback",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::Phaser,
        name: "Phaser",
        description: "Four-stage allpass phaser",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::Tremolo,
        name: "Tremolo",
        description: "LFO amplitude modulation",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::RingModulator,
        name: "Ring Modulator",
        description: "Carrier-sine ring modulation",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::VoiceModulator,
        name: "Voice Modulator",
        description: "Delay-line pitch shifter",
        category: EffectCategory::Modulation,
    },
    EffectDescriptor {
        kind: EffectKind::Delay,
        name: "Delay",
        description: "Feedback echo delay",
        category: EffectCategory::TimeBased,
    },
    EffectDescriptor {
        kind: EffectKind::Reverb,
        name: "Reverb",
        description: "Comb-based reverb",
        category: EffectCategory::TimeBased,
    },
    EffectDescriptor {
        kind: EffectKind::Compressor,
        name: "Compressor",
        description: "Downward compressor",
        category: EffectCategory::Dynamics,
    },
    EffectDescriptor {
        kind: EffectKind::Limiter,
        name: "Limiter",
        description: "Stereo-linked peak limiter",
        category: EffectCategory::Dynamics,
    },
    EffectDescriptor {
        kind: EffectKind::NoiseGate,
        name: "Noise Gate",
        description: "Downward expander gate",
        category: EffectCategory::Dynamics,
    },
    EffectDescriptor {
        kind: EffectKind::AutoWah,
        name: "Auto Wah",
        description: "Envelope-following wah filter",
        category: EffectCategory::Filter,
    },
    EffectDescriptor {
        kind: EffectKind::SpectrumAnalyzer,
        name: "Spectrum Analyzer",
        description: "Audio-transparent FFT meter",
        category: EffectCategory::Analysis,
    },
    EffectDescriptor {
        kind: EffectKind::KickDrum,
        name: "Kick Drum",
        description: "Swept-sine kick voice",
        category: EffectCategory::Drums,
    },
    EffectDescriptor {
        kind: EffectKind::SnareDrum,
        name: "Snare Drum",
        description: "Shell tone plus wire noise",
        category: EffectCategory::Drums,
    },
    EffectDescriptor {
        kind: EffectKind::HiHat,
        name: "Hi-Hat",
        description: "Filtered noise burst",
        category: EffectCategory::Drums,
    },
    EffectDescriptor {
        kind: EffectKind::TomDrum,
        name: "Tom",
        description: "Swept-sine tom voice",
        category: EffectCategory::Drums,
    },
    EffectDescriptor {
        kind: EffectKind::Cymbal,
        name: "Cymbal",
        description: "Metallic partial stack crash",
        category: EffectCategory::Drums,
    },
];

impl EffectCatalog {
    /// Create a catalog.
    pub fn new() -> Self {
        Self
    }

    /// Descriptors for every effect kind, in tag order.
    pub fn all(&self) -> &'static [EffectDescriptor] {
        &DESCRIPTORS
    }

    /// Descriptor for one kind.
    pub fn get(&self, kind: EffectKind) -> &'static EffectDescriptor {
        &DESCRIPTORS[kind.tag() as usize]
    }

    /// Descriptors in a given category.
    pub fn in_category(&self, category: EffectCategory) -> Vec<&'static EffectDescriptor> {
        DESCRIPTORS
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Construct a fresh effect at the given sample rate.
    pub fn create(&self, kind: EffectKind, sample_rate: f32) -> Box<dyn Effect> {
        match kind {
            EffectKind::Preamp => Box::new(Preamp::new(sample_rate)),
            EffectKind::Distortion => Box::new(Distortion::new(sample_rate)),
            EffectKind::Overdrive => Box::new(Overdrive::new(sample_rate)),
            EffectKind::Warmth => Box::new(Warmth::new(sample_rate)),
            EffectKind::LoFi => Box::new(LoFi::new(sample_rate)),
            EffectKind::Bitcrusher => Box::new(Bitcrusher::new(sample_rate)),
            EffectKind::Equalizer => Box::new(Equalizer::new(sample_rate)),
            EffectKind::Tone => Box::new(Tone::new(sample_rate)),
            EffectKind::Chorus => Box::new(Chorus::new(sample_rate)),
            EffectKind::Flanger => Box::new(Flanger::new(sample_rate)),
            EffectKind::Phaser => Box::new(Phaser::new(sample_rate)),
            EffectKind::Tremolo => Box::new(Tremolo::new(sample_rate)),
            EffectKind::RingModulator => Box::new(RingModulator::new(sample_rate)),
            EffectKind::VoiceModulator => Box::new(VoiceModulator::new(sample_rate)),
            EffectKind::Delay => Box::new(Delay::new(sample_rate)),
            EffectKind::Reverb => Box::new(Reverb::new(sample_rate)),
            EffectKind::Compressor => Box::new(Compressor::new(sample_rate)),
            EffectKind::Limiter => Box::new(Limiter::new(sample_rate)),
            EffectKind::NoiseGate => Box::new(NoiseGate::new(sample_rate)),
            EffectKind::AutoWah => Box::new(AutoWah::new(sample_rate)),
            EffectKind::SpectrumAnalyzer => Box::new(SpectrumAnalyzer::new(sample_rate)),
            EffectKind::KickDrum => Box::new(KickDrum::new(sample_rate)),
            EffectKind::SnareDrum => Box::new(SnareDrum::new(sample_rate)),
            EffectKind::HiHat => Box::new(HiHat::new(sample_rate)),
            EffectKind::TomDrum => Box::new(TomDrum::new(sample_rate)),
            EffectKind::Cymbal => Box::new(Cymbal::new(sample_rate)),
        }
    }

    /// Construct from a serialization tag; `None` for unknown tags.
    pub fn create_from_tag(&self, tag: u32, sample_rate: f32) -> Option<Box<dyn Effect>> {
        EffectKind::from_tag(tag).map(|kind| self.create(kind, sample_rate))
    }
}
