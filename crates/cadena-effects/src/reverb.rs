//! Comb-based reverb.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use cadena_core::{
    DelayLine, Effect, EffectKind, FloatParam, OnePoleLp, Param, ParamUnit, SettingsBank,
    flush_denormal, lerp, wet_dry_mix,
};
use libm::logf;

/// Comb buffer capacity in milliseconds.
const MAX_SIZE_MS: f32 = 120.0;

/// -60 dB decay threshold for the tail estimate.
const TAIL_THRESHOLD: f32 = 0.001;

/// Parameters for [`Reverb`].
#[derive(Debug)]
pub struct ReverbSettings {
    /// Recirculation amount in percent.
    pub decay: FloatParam,
    /// Comb length for the first channel in milliseconds.
    pub size_left_ms: FloatParam,
    /// Comb length for the last channel in milliseconds.
    pub size_right_ms: FloatParam,
    /// High-frequency damping in percent.
    pub damping: FloatParam,
    /// Wet/dry mix in percent.
    pub wet: FloatParam,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            decay: FloatParam::new("Decay", 50.0, 0.0, 95.0, ParamUnit::Percent),
            size_left_ms: FloatParam::new("Size L", 31.0, 10.0, MAX_SIZE_MS, ParamUnit::Milliseconds),
            size_right_ms: FloatParam::new("Size R", 43.0, 10.0, MAX_SIZE_MS, ParamUnit::Milliseconds),
            damping: FloatParam::new("Damping", 40.0, 0.0, 100.0, ParamUnit::Percent),
            wet: FloatParam::new("Wet", 35.0, 0.0, 100.0, ParamUnit::Percent),
        }
    }
}

impl SettingsBank for ReverbSettings {
    fn effect_name(&self) -> &'static str {
        "Reverb"
    }

    fn params(&self) -> Vec<&dyn Param> {
        vec![
            &self.decay,
            &self.size_left_ms,
            &self.size_right_ms,
            &self.damping,
            &self.wet,
        ]
    }
}

/// Per-channel comb state.
#[derive(Debug)]
struct CombChannel {
    line: DelayLine,
    damp: OnePoleLp,
}

/// Feedback-comb reverb with per-channel decorrelated lengths.
///
/// Each channel runs one damped feedback comb. The comb length is linearly
/// interpolated between the "Size L" and "Size R" knobs across the channel
/// index, so no two channels share a resonance and the tail widens instead
/// of ringing at one pitch.
#[derive(Debug)]
pub struct Reverb {
    settings: Arc<ReverbSettings>,
    enabled: bool,
    sample_rate: f32,
    channels: Vec<CombChannel>,
    last_damping: f32,
}

impl Reverb {
    /// Create a reverb.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settings: Arc::new(ReverbSettings::default()),
            enabled: true,
            sample_rate,
            channels: Vec::new(),
            last_damping: f32::NAN,
        }
    }

    /// Typed access to the settings aggregate.
    pub fn settings(&self) -> &ReverbSettings {
        &self.settings
    }

    fn damp_cutoff(damping: f32) -> f32 {
        lerp(12000.0, 1500.0, damping / 100.0)
    }

    fn ensure_channels(&mut self, channels: usize) {
        while self.channels.len() < channels {
            self.channels.push(CombChannel {
                line: DelayLine::from_seconds(self.sample_rate, MAX_SIZE_MS / 1000.0),
                damp: OnePoleLp::new(self.sample_rate, Self::damp_cutoff(40.0)),
            });
        }
    }
}

impl Effect for Reverb {
    fn kind(&self) -> EffectKind {
        EffectKind::Reverb
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

    fn process(&mut self, buffer: &mut [f32], channels: usize) {
        if !self.enabled || channels == 0 {
            return;
        }
        let wet = self.settings.wet.get() / 100.0;
        if wet <= 0.001 {
            return;
        }
        let decay = self.settings.decay.get() / 100.0;
        let size_l = self.settings.size_left_ms.get();
        let size_r = self.settings.size_right_ms.get();
        let damping = self.settings.damping.get();

        let had_channels = self.channels.len();
        self.ensure_channels(channels);
        if self.channels.len() != had_channels {
            self.last_damping = f32::NAN;
        }
        if damping != self.last_damping {
            let cutoff = Self::damp_cutoff(damping);
            for state in &mut self.channels {
                state.damp.set_cutoff(self.sample_rate, cutoff);
            }
            self.last_damping = damping;
        }

        // Per-channel comb length, lerped across the channel index and
        // clamped to the allocated buffer.
        let ms_to_samples = self.sample_rate / 1000.0;
        let span = if channels > 1 { (channels - 1) as f32 } else { 1.0 };

        for frame in buffer.chunks_exact_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let dry = *sample;
                let t = if channels > 1 { ch as f32 / span } else { 0.0 };
                let state = &mut self.channels[ch];
                let length = (lerp(size_l, size_r, t) * ms_to_samples)
                    .min((state.line.capacity() - 1) as f32) as usize;

                let delayed = state.line.read_int(length);
                let damped = state.damp.process(delayed);
                state.line.write(flush_denormal(dry + damped * decay));
                *sample = wet_dry_mix(dry, delayed, wet);
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let channels = self.channels.len();
        self.channels.clear();
        self.ensure_channels(channels);
        self.last_damping = f32::NAN;
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.line.clear();
            state.damp.reset();
        }
    }

    /// Tail estimate from the comb recirculation: level falls by the decay
    /// factor once per comb period until it crosses -60 dB.
    fn tail_seconds(&self) -> f32 {
        let decay = self.settings.decay.get() / 100.0;
        let size_s = self
            .settings
            .size_left_ms
            .get()
            .max(self.settings.size_right_ms.get())
            / 1000.0;
        if decay <= 0.0 {
            return size_s;
        }
        logf(TAIL_THRESHOLD) / logf(decay) * size_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_zero_is_identity() {
        let mut reverb = Reverb::new(48000.0);
        reverb.settings().wet.set(0.0);
        let mut buffer = [0.5f32; 256];
        let original = buffer;
        reverb.process(&mut buffer, 2);
        assert_eq!(&buffer[..], &original[..]);
    }

    #[test]
    fn impulse_leaves_a_tail() {
        let mut reverb = Reverb::new(48000.0);
        reverb.settings().wet.set(100.0);
        reverb.settings().decay.set(80.0);

        let mut buffer = vec![0.0f32; 48000];
        buffer[0] = 1.0;
        reverb.process(&mut buffer, 1);

        // Energy must persist well after the first comb period (~31 ms)
        let late = &buffer[9600..]; // after 200 ms
        let late_peak = late.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(late_peak > 0.01, "tail died too fast, peak {late_peak}");
    }

    #[test]
    fn stereo_channels_decorrelate() {
        let mut reverb = Reverb::new(48000.0);
        reverb.settings().wet.set(100.0);

        let mut buffer = vec![0.0f32; 48000];
        buffer[0] = 1.0; // left impulse
        buffer[1] = 1.0; // right impulse
        reverb.process(&mut buffer, 2);

        // With different comb lengths the channels must diverge
        let diff: f32 = buffer
            .chunks_exact(2)
            .map(|f| (f[0] - f[1]).abs())
            .sum();
        assert!(diff > 0.1, "channels should decorrelate, diff {diff}");
    }

    #[test]
    fn decay_shortens_tail_estimate() {
        let reverb = Reverb::new(48000.0);
        reverb.settings().decay.set(90.0);
        let long = reverb.tail_seconds();
        reverb.settings().decay.set(30.0);
        let short = reverb.tail_seconds();
        assert!(long > short, "long {long} vs short {short}");
    }

    #[test]
    fn stays_finite_at_max_decay() {
        let mut reverb = Reverb::new(48000.0);
        reverb.settings().decay.set(95.0);
        reverb.settings().wet.set(100.0);
        let mut buffer: Vec<f32> = (0..96000)
            .map(|i| libm::sinf(core::f32::consts::TAU * 440.0 * i as f32 / 48000.0) * 0.5)
            .collect();
        reverb.process(&mut buffer, 2);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
