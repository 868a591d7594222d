//! Cadena Effects - the concrete effect implementations
//!
//! Every effect in this crate follows the same shape: a settings struct
//! (one atomic parameter per field, listed once in declaration order -
//! that order is the binary wire order) and an effect struct implementing
//! [`cadena_core::Effect`] over interleaved multi-channel buffers.
//!
//! All effects honor the universal bypass contract: disabled, or with a
//! wet/level parameter at zero, `process` leaves the buffer untouched.
//!
//! ## Example
//!
//! ```rust
//! use cadena_core::Effect;
//! use cadena_effects::Distortion;
//!
//! let mut dist = Distortion::new(48000.0);
//! dist.settings().drive_db.set(24.0);
//!
//! // One stereo frame, interleaved
//! let mut buffer = [0.5f32, -0.5];
//! dist.process(&mut buffer, 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod auto_wah;
pub mod bitcrusher;
pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod equalizer;
pub mod flanger;
pub mod gate;
pub mod limiter;
pub mod lofi;
pub mod overdrive;
pub mod phaser;
pub mod preamp;
pub mod reverb;
pub mod ring_mod;
pub mod tone;
pub mod tremolo;
pub mod voice_mod;
pub mod warmth;

// Re-export main types at crate root
pub use auto_wah::AutoWah;
pub use bitcrusher::Bitcrusher;
pub use chorus::Chorus;
pub use compressor::Compressor;
pub use delay::Delay;
pub use distortion::Distortion;
pub use equalizer::Equalizer;
pub use flanger::Flanger;
pub use gate::NoiseGate;
pub use limiter::Limiter;
pub use lofi::LoFi;
pub use overdrive::Overdrive;
pub use phaser::Phaser;
pub use preamp::Preamp;
pub use reverb::Reverb;
pub use ring_mod::RingModulator;
pub use tone::Tone;
pub use tremolo::Tremolo;
pub use voice_mod::VoiceModulator;
pub use warmth::Warmth;
