//! Cadena Core - the effect/parameter model and shared DSP primitives
//!
//! This crate is the foundation of the cadena effects rack. It defines the
//! vocabulary every other crate speaks:
//!
//! # Effect System
//!
//! - [`Effect`] - Object-safe trait for all audio effects, processing an
//!   interleaved multi-channel float buffer in place
//! - [`EffectKind`] - Closed set of effect types with stable integer tags
//!   (the tags are the serialization contract and are never renumbered)
//!
//! # Parameters & Settings
//!
//! - [`FloatParam`] / [`IntParam`] / [`BoolParam`] - Atomic, bounded,
//!   lock-free value holders safe to read from the audio thread while a
//!   control thread writes
//! - [`SettingsBank`] - An effect's ordered parameter aggregate; the
//!   declaration order is the binary wire order
//! - [`FactoryPreset`] - Named parameter snapshots, built lazily
//!
//! # DSP Building Blocks
//!
//! - [`OnePoleLp`] / [`OnePoleHp`] - First-order IIR filters
//! - [`Biquad`] - Second-order IIR with RBJ cookbook coefficients
//! - [`DelayLine`] - Power-of-two circular buffer with fractional reads
//! - [`EnvelopeFollower`] - Peak detector with asymmetric attack/release
//! - [`Lfo`] - Phase-accumulator low-frequency oscillator
//! - [`Smoother`] - Fixed-coefficient one-pole parameter de-zipper
//! - Math utilities: [`db_to_linear`], [`soft_clip`], [`flush_denormal`], ...
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets. Disable the
//! default `std` feature:
//!
//! ```toml
//! [dependencies]
//! cadena-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation inside `process`; buffers grow only
//!   on sample-rate or channel-count changes
//! - **Lock-free parameters**: atomics, never a mutex in the audio path
//! - **Closed effect set**: stable tags instead of open registration, so
//!   saved racks deserialize without any runtime type information

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod delay_line;
pub mod effect;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod param;
pub mod settings;
pub mod smooth;

// Re-export main types at crate root
pub use biquad::{
    Biquad, BiquadCoeffs, high_shelf_coeffs, low_shelf_coeffs, peaking_coeffs,
};
pub use delay_line::DelayLine;
pub use effect::{Effect, EffectKind, grow_channels};
pub use envelope::EnvelopeFollower;
pub use lfo::{Lfo, LfoShape};
pub use math::{
    db_to_linear, flush_denormal, hard_clip, lerp, linear_to_db, soft_clip, soft_clip_cubic,
    wet_dry_mix,
};
pub use one_pole::{OnePoleHp, OnePoleLp};
pub use param::{BoolParam, FloatParam, IntParam, Param, ParamUnit, ParamValue};
pub use settings::{FactoryPreset, SettingsBank};
pub use smooth::Smoother;
