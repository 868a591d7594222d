//! Passthrough spectrum analyzer.

use std::sync::Arc;

use cadena_core::{
    Effect, EffectKind, IntParam, Param, ParamUnit, SettingsBank,
};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Capture window and FFT length (power of two).
pub const FFT_SIZE: usize = 512;

/// Per-call decay factor for the bar meters.
const BAR_DECAY: f32 = 0.88;

/// Lowest frequency shown by the bar mapping, in Hz.
const MIN_FREQ_HZ: f32 = 40.0;

/// Parameters for [`SpectrumAnalyzer`].
#[derive(Debug)]
pub struct SpectrumAnalyzerSettings {
    /// Number of display bars.
    pub bars: IntParam,
}

impl Default for SpectrumAnalyzerSettings {
    fn default() -> Self {
        Self {
            bars: IntParam::new("Bars", 32, 8, 64, ParamUnit::None),
        }
    }
}

impl SettingsBank for SpectrumAnalyzerSettings {
    fn effect_name(&self) -> &'static str {
        "Spectrum Analyzer"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![&self.bars]
    }
}

/// Audio-transparent FFT analyzer.
///
/// The audio thread writes the mono average of every frame into a
/// [`FFT_SIZE`] circular buffer. On demand, [`Self::bar_levels`] copies
/// out the most recent window, applies a Hann window, runs a forward FFT
/// and folds the positive-frequency bins into
/// logarithmically spaced bars. Bars rise instantly to a new peak and
/// decay by [`BAR_DECAY`] per call - hold-and-decay meter ballistics, not
/// an average.
pub struct SpectrumAnalyzer {
    settings: Arc<SpectrumAnalyzerSettings>,
    enabled: bool,
    sample_rate: f32,
    capture: [f32; FFT_SIZE],
    capture_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    window: [f32; FFT_SIZE],
    bars: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer.
    pub fn new(sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        let mut window = [0.0f32; FFT_SIZE];
        for (i, w) in window.iter_mut().enumerate() {
            *w = 0.5
                * (1.0
                    - (core::f32::consts::TAU * i as f32 / FFT_SIZE as f32).cos());
        }

        Self {
            settings: Arc::new(SpectrumAnalyzerSettings::default()),
            enabled: true,
            sample_rate,
            capture: [0.0; FFT_SIZE],
            capture_pos: 0,
            fft,
            window,
            bars: Vec::new(),
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &SpectrumAnalyzerSettings {
        &self.settings
    }

    /// Compute the current display bars.
    ///
    /// Returns one level per bar, log-spaced from [`MIN_FREQ_HZ`] to
    /// Nyquist. Intended for the display thread; allocation and FFT cost
    /// live here, never in `process`.
    pub fn bar_levels(&mut self) -> Vec<f32> {
        let bar_count = self.settings.bars.get() as usize;
        if self.bars.len() != bar_count {
            self.bars = vec![0.0; bar_count];
        }

        // Unroll the circular capture into chronological order
        let mut frame = [Complex::new(0.0f32, 0.0); FFT_SIZE];
        for (i, slot) in frame.iter_mut().enumerate() {
            let pos = (self.capture_pos + i) % FFT_SIZE;
            *slot = Complex::new(self.capture[pos] * self.window[i], 0.0);
        }
        self.fft.process(&mut frame);

        // Positive-frequency magnitudes, normalized for the Hann window
        let scale = 2.0 / FFT_SIZE as f32;
        let bins = FFT_SIZE / 2;
        let nyquist = self.sample_rate * 0.5;
        let min_bin = (MIN_FREQ_HZ / nyquist * bins as f32).max(1.0);
        let ratio = bins as f32 / min_bin;

        for (bar, level) in self.bars.iter_mut().enumerate() {
            // Log-spaced bin span for this bar
            let lo = min_bin * ratio.powf(bar as f32 / bar_count as f32);
            let hi = min_bin * ratio.powf((bar + 1) as f32 / bar_count as f32);
            let lo = lo as usize;
            let hi = (hi as usize).clamp(lo + 1, bins);

            let mut peak = 0.0f32;
            for bin in &frame[lo..hi] {
                let magnitude = bin.norm() * scale;
                if magnitude > peak {
                    peak = magnitude;
                }
            }

            // Instant rise, slow fall
            if peak > *level {
                *level = peak;
            } else {
                *level *= BAR_DECAY;
            }
        }
        self.bars.clone()
    }
}

impl Effect for SpectrumAnalyzer {
    fn kind(&self) -> EffectKind {
        EffectKind::SpectrumAnalyzer
    }

    fn settings(&self) -> Arc<dyn SettingsBank> {
        self.settings.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.reset();
    }

    /// Captures the mono average of each frame; the buffer itself is
    /// never modified.
    fn process(&mut self, buffer: &mut [f32], channels: usize) {
        if !self.enabled || channels == 0 {
            return;
        }
        let inv_channels = 1.0 / channels as f32;
        for frame in buffer.chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() * inv_channels;
            self.capture[self.capture_pos] = mono;
            self.capture_pos = (self.capture_pos + 1) % FFT_SIZE;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.capture = [0.0; FFT_SIZE];
        self.capture_pos = 0;
        self.bars.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_sine(analyzer: &mut SpectrumAnalyzer, freq: f32, frames: usize) {
        let mut buffer: Vec<f32> = (0..frames)
            .map(|i| (core::f32::consts::TAU * freq * i as f32 / 48000.0).sin())
            .collect();
        analyzer.process(&mut buffer, 1);
    }

    #[test]
    fn buffer_is_never_modified() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0);
        let mut buffer: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.01).sin()).collect();
        let original = buffer.clone();
        analyzer.process(&mut buffer, 2);
        assert_eq!(buffer, original);
    }

    #[test]
    fn sine_peaks_in_the_right_bar() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0);
        feed_sine(&mut analyzer, 1000.0, 2048);

        let bars = analyzer.bar_levels();
        let loudest = bars
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        // 1 kHz on a 40 Hz..24 kHz log axis with 32 bars:
        // bar = 32 * ln(1000/40) / ln(24000/40) ~ 16
        assert!(
            (13..=19).contains(&loudest),
            "1 kHz peaked in bar {loudest}"
        );
        assert!(bars[loudest] > 0.3, "peak level {}", bars[loudest]);
    }

    #[test]
    fn bars_decay_after_silence() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0);
        feed_sine(&mut analyzer, 1000.0, 2048);
        let before = analyzer.bar_levels();
        let peak_bar = before
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        // Silence in, then poll twice: level falls by the decay factor
        let mut silence = vec![0.0f32; 2048];
        analyzer.process(&mut silence, 1);
        let after_one = analyzer.bar_levels();
        let after_two = analyzer.bar_levels();

        let expected = before[peak_bar] * BAR_DECAY;
        assert!(
            (after_one[peak_bar] - expected).abs() < 1e-5,
            "one poll: {} vs {expected}",
            after_one[peak_bar]
        );
        assert!(after_two[peak_bar] < after_one[peak_bar]);
    }

    #[test]
    fn bars_rise_instantly() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0);
        // Establish decayed state
        let mut silence = vec![0.0f32; 4096];
        analyzer.process(&mut silence, 1);
        let quiet = analyzer.bar_levels();
        assert!(quiet.iter().all(|level| *level < 1e-3));

        // One loud window is enough for the bar to jump to full level
        feed_sine(&mut analyzer, 1000.0, 2048);
        let loud = analyzer.bar_levels();
        assert!(loud.iter().any(|level| *level > 0.3));
    }

    #[test]
    fn bar_count_follows_setting() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0);
        analyzer.settings().bars.set(16);
        assert_eq!(analyzer.bar_levels().len(), 16);
        analyzer.settings().bars.set(64);
        assert_eq!(analyzer.bar_levels().len(), 64);
    }
}
