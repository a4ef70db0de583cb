use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of built-in synth presets.
pub const PRESET_COUNT: usize = 100;

/// Near-silent level envelopes start and end at.
pub const ENVELOPE_FLOOR: f32 = 0.0001;

/// Default peak gain of a preset tone.
pub const DEFAULT_TONE_GAIN: f32 = 0.9;

const LFO_DEPTH_RATIO: f64 = 0.003;
const LOWPASS_MAX_HZ: f64 = 8000.0;
const LOWPASS_FREQ_RATIO: f64 = 8.0;

/// Oscillator shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Preset rotation order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Sawtooth => "sawtooth",
            Self::Triangle => "triangle",
        }
    }

    /// Sample at `phase` cycles (fractional part used).
    pub fn sample(self, phase: f64) -> f64 {
        let ph = phase.rem_euclid(1.0);
        match self {
            Self::Sine => (ph * TAU).sin(),
            Self::Square => {
                if ph < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Sawtooth => 2.0 * ph - 1.0,
            Self::Triangle => 1.0 - 4.0 * (ph - 0.5).abs(),
        }
    }
}

/// One built-in synth voice.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SynthPreset {
    /// Stable identifier (`preset_1` .. `preset_100`).
    pub id: String,
    /// Human-readable label.
    pub name: String,
    pub waveform: Waveform,
    /// Base frequency in Hz.
    pub freq_hz: f64,
    /// Seconds to reach peak.
    pub attack: f64,
    /// Seconds from peak to sustain level.
    pub decay: f64,
    /// Sustain level as a fraction of peak.
    pub sustain: f64,
    /// Seconds to fade out after the tone ends.
    pub release: f64,
}

impl SynthPreset {
    /// Preset number `i` (0-based).
    pub fn nth(i: usize) -> Self {
        let waveform = Waveform::ALL[i % Waveform::ALL.len()];
        let freq = 110 + (i as f64 * 6.5).round() as u32;
        Self {
            id: format!("preset_{}", i + 1),
            name: format!(
                "Preset {} - {} {freq}Hz",
                i + 1,
                waveform.as_str()[..3].to_ascii_uppercase()
            ),
            waveform,
            freq_hz: f64::from(freq),
            attack: 0.01 + (i % 6) as f64 * 0.02,
            decay: 0.15 + (i % 8) as f64 * 0.03,
            sustain: 0.2 + ((i % 5) as f64 / 5.0) * 0.6,
            release: 0.1 + (i % 7) as f64 * 0.02,
        }
    }

    /// Envelope of a tone lasting `duration_secs` with peak `gain`.
    pub fn envelope(&self, duration_secs: f64, gain: f32) -> Envelope {
        Envelope {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
            duration: duration_secs.max(0.0),
            gain,
        }
    }
}

/// All built-in presets, in id order.
pub fn presets() -> Vec<SynthPreset> {
    (0..PRESET_COUNT).map(SynthPreset::nth).collect()
}

/// Look up a preset by id.
pub fn preset_by_id(id: &str) -> Option<SynthPreset> {
    let n: usize = id.strip_prefix("preset_")?.parse().ok()?;
    (1..=PRESET_COUNT).contains(&n).then(|| SynthPreset::nth(n - 1))
}

/// Piecewise-linear amplitude envelope.
///
/// Breakpoints: floor at 0, `gain` at `attack`, `sustain * gain` at `attack + decay`, floor at
/// `duration + release`. Silent afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    /// Tone duration in seconds.
    pub duration: f64,
    /// Peak gain.
    pub gain: f32,
}

impl Envelope {
    /// Time the envelope returns to the floor.
    pub fn end_secs(&self) -> f64 {
        (self.duration + self.release).max(self.attack + self.decay)
    }

    /// Amplitude at `t` seconds after note-on.
    pub fn amplitude_at(&self, t: f64) -> f32 {
        let floor = f64::from(ENVELOPE_FLOOR);
        let gain = f64::from(self.gain);
        let points = [
            (0.0, floor),
            (self.attack, gain),
            (self.attack + self.decay, self.sustain * gain),
            (self.end_secs(), floor),
        ];

        if t < 0.0 || t > self.end_secs() {
            return 0.0;
        }
        for w in points.windows(2) {
            let (t0, v0) = w[0];
            let (t1, v1) = w[1];
            if t <= t1 {
                if t1 <= t0 {
                    return v1 as f32;
                }
                let f = (t - t0) / (t1 - t0);
                return (v0 + (v1 - v0) * f) as f32;
            }
        }
        ENVELOPE_FLOOR
    }
}

/// Second-order low-pass filter (RBJ biquad, direct form I).
#[derive(Clone, Debug)]
pub struct Lowpass {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    sample_rate: f64,
    q: f64,
}

impl Lowpass {
    /// Butterworth-Q filter at `cutoff_hz`.
    pub fn new(cutoff_hz: f64, sample_rate: u32) -> Self {
        let mut f = Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            sample_rate: f64::from(sample_rate.max(1)),
            q: std::f64::consts::FRAC_1_SQRT_2,
        };
        f.set_cutoff(cutoff_hz);
        f
    }

    /// Move the cutoff, keeping filter state.
    pub fn set_cutoff(&mut self, cutoff_hz: f64) {
        let nyquist_guard = self.sample_rate * 0.45;
        let fc = cutoff_hz.clamp(10.0, nyquist_guard);
        let w0 = TAU * fc / self.sample_rate;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * self.q);
        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos) / 2.0 / a0;
        self.b1 = (1.0 - cos) / a0;
        self.b2 = (1.0 - cos) / 2.0 / a0;
        self.a1 = -2.0 * cos / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Filter one sample.
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Pitch-modulation rate for `seed`, in `[3, 9)` Hz.
pub fn lfo_rate_for_seed(seed: u64) -> f64 {
    StdRng::seed_from_u64(seed).gen_range(3.0..9.0)
}

/// Render one preset tone to mono samples.
///
/// The oscillator pitch wobbles by `freq * 0.003` at `lfo_rate_hz` and runs through a low-pass at
/// `min(8000, freq * 8)` Hz before the envelope.
pub fn render_preset(
    preset: &SynthPreset,
    duration_secs: f64,
    gain: f32,
    lfo_rate_hz: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let env = preset.envelope(duration_secs, gain);
    let sr = f64::from(sample_rate.max(1));
    let n = (env.end_secs() * sr).ceil() as usize;
    let depth = preset.freq_hz * LFO_DEPTH_RATIO;
    let mut filter = Lowpass::new(
        (preset.freq_hz * LOWPASS_FREQ_RATIO).min(LOWPASS_MAX_HZ),
        sample_rate,
    );

    let mut phase = 0.0f64;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 / sr;
        let freq = preset.freq_hz + depth * (TAU * lfo_rate_hz * t).sin();
        let x = filter.process(preset.waveform.sample(phase));
        out.push((x * f64::from(env.amplitude_at(t))).clamp(-1.0, 1.0) as f32);
        phase = (phase + freq / sr).rem_euclid(1.0);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
