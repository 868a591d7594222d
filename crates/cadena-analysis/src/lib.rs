//! Cadena Analysis - the FFT spectrum analyzer effect
//!
//! [`SpectrumAnalyzer`] is an audio-transparent rack member: `process`
//! never modifies the buffer, it only feeds a capture ring with the
//! mono-averaged signal. A display thread asks for
//! [`SpectrumAnalyzer::bar_levels`] whenever it repaints and gets
//! log-spaced magnitude bars with meter ballistics: a bar jumps up
//! immediately on a new peak and falls by 12% per call otherwise.

pub mod analyzer;

pub use analyzer::{FFT_SIZE, SpectrumAnalyzer};
