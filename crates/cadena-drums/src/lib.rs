//! Cadena Drums - synthesized drum voices
//!
//! Each drum is a one-shot, envelope-driven sound generator wrapped as an
//! [`Effect`](cadena_core::Effect). Unlike the filter-style effects, drums
//! do not transform the buffer contents: they **add** a mono voice sample
//! into every channel of each frame, layering on top of whatever is
//! already there.
//!
//! A voice fires when its "Trigger" parameter is set (the effect consumes
//! the flag), runs its exponentially decaying envelopes, and deactivates
//! itself once the envelope falls below audibility - after that the effect
//! early-returns at zero cost until the next trigger.
//!
//! ```rust
//! use cadena_core::Effect;
//! use cadena_drums::KickDrum;
//!
//! let mut kick = KickDrum::new(48000.0);
//! kick.settings().trigger.set(true);
//!
//! let mut buffer = vec![0.0f32; 512];
//! kick.process(&mut buffer, 2);
//! assert!(buffer.iter().any(|s| s.abs() > 0.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod cymbal;
pub mod hihat;
pub mod kick;
pub mod snare;
pub mod tom;
pub mod voice;

pub use cymbal::Cymbal;
pub use hihat::HiHat;
pub use kick::KickDrum;
pub use snare::SnareDrum;
pub use tom::TomDrum;
pub use voice::{DecayEnvelope, NoiseSource};
