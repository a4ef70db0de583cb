//! Soundtrack generation: synth presets, whooshes, uploaded clips and routing.

pub mod clip;
pub mod engine;
pub mod synth;
pub mod whoosh;

/// Sample rate of every buffer the crate produces.
pub const SAMPLE_RATE: u32 = 48_000;

/// Decoded or synthesized interleaved `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Samples per second.
    pub sample_rate: u32,
    /// Interleaved channels.
    pub channels: u16,
    /// Interleaved samples in `[-1, 1]`.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Stereo buffer duplicating a mono signal into both channels.
    pub fn stereo_from_mono(mono: &[f32], sample_rate: u32) -> Self {
        let mut interleaved_f32 = Vec::with_capacity(mono.len() * 2);
        for &s in mono {
            interleaved_f32.push(s);
            interleaved_f32.push(s);
        }
        Self {
            sample_rate,
            channels: 2,
            interleaved_f32,
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.interleaved_f32
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Multiply every sample by `gain`.
    pub fn apply_gain(&mut self, gain: f32) {
        for s in &mut self.interleaved_f32 {
            *s *= gain;
        }
    }

    /// Prepend `secs` of silence.
    pub fn delay(&mut self, secs: f64) {
        let frames = (secs.max(0.0) * f64::from(self.sample_rate)).round() as usize;
        if frames == 0 {
            return;
        }
        let pad = frames * usize::from(self.channels);
        self.interleaved_f32
            .splice(0..0, std::iter::repeat_n(0.0, pad));
    }

    /// Truncate or pad with silence to exactly `secs`.
    pub fn fit_to_secs(&mut self, secs: f64) {
        let frames = (secs.max(0.0) * f64::from(self.sample_rate)).round() as usize;
        self.interleaved_f32
            .resize(frames * usize::from(self.channels), 0.0);
    }
}

#[cfg(test)]
#[path = "../tests/unit/audio/pcm.rs"]
mod tests;
