use crate::animation::style::StyleTag;
use crate::audio::synth::{Lowpass, Waveform};

const CUTOFF_UPDATE_EVERY: usize = 32;

/// Shape of an exponential pitch and filter sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WhooshShape {
    pub waveform: Waveform,
    /// Oscillator frequency at the start, Hz.
    pub start_hz: f64,
    /// Oscillator frequency at the end, Hz.
    pub end_hz: f64,
    /// Filter cutoff at the start, Hz.
    pub cutoff_start_hz: f64,
    /// Filter cutoff at the end, Hz.
    pub cutoff_end_hz: f64,
    /// Sweep length in seconds (0.3 to 0.6).
    pub duration_secs: f64,
}

impl WhooshShape {
    /// True when the oscillator sweeps upward.
    pub fn rising(&self) -> bool {
        self.end_hz > self.start_hz
    }
}

/// Sweep matching an animation style.
///
/// Horizontal entries sweep down, vertical entries sweep up, zoom sweeps up over a wide range
/// and fade uses a soft sine sweep down.
pub fn whoosh_for_style(style: StyleTag) -> WhooshShape {
    match style {
        StyleTag::Left | StyleTag::Right => WhooshShape {
            waveform: Waveform::Sawtooth,
            start_hz: 900.0,
            end_hz: 120.0,
            cutoff_start_hz: 6000.0,
            cutoff_end_hz: 400.0,
            duration_secs: 0.45,
        },
        StyleTag::Top | StyleTag::Bottom => WhooshShape {
            waveform: Waveform::Sawtooth,
            start_hz: 150.0,
            end_hz: 1000.0,
            cutoff_start_hz: 500.0,
            cutoff_end_hz: 6000.0,
            duration_secs: 0.4,
        },
        StyleTag::Zoom => WhooshShape {
            waveform: Waveform::Triangle,
            start_hz: 80.0,
            end_hz: 1800.0,
            cutoff_start_hz: 300.0,
            cutoff_end_hz: 9000.0,
            duration_secs: 0.6,
        },
        StyleTag::Fade => WhooshShape {
            waveform: Waveform::Sine,
            start_hz: 500.0,
            end_hz: 150.0,
            cutoff_start_hz: 2000.0,
            cutoff_end_hz: 300.0,
            duration_secs: 0.6,
        },
        _ => WhooshShape {
            waveform: Waveform::Sawtooth,
            start_hz: 700.0,
            end_hz: 150.0,
            cutoff_start_hz: 4000.0,
            cutoff_end_hz: 350.0,
            duration_secs: 0.3,
        },
    }
}

fn exp_sweep(start: f64, end: f64, f: f64) -> f64 {
    start * (end / start).powf(f.clamp(0.0, 1.0))
}

/// Render a sweep to mono samples with a short attack and linear fade-out.
pub fn render_whoosh(shape: &WhooshShape, gain: f32, sample_rate: u32) -> Vec<f32> {
    let sr = f64::from(sample_rate.max(1));
    let n = (shape.duration_secs * sr).ceil() as usize;
    let attack = (n / 10).max(1);
    let mut filter = Lowpass::new(shape.cutoff_start_hz, sample_rate);

    let mut phase = 0.0f64;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let f = i as f64 / n as f64;
        if i % CUTOFF_UPDATE_EVERY == 0 {
            filter.set_cutoff(exp_sweep(shape.cutoff_start_hz, shape.cutoff_end_hz, f));
        }
        let amp = if i < attack {
            i as f64 / attack as f64
        } else {
            1.0 - (i - attack) as f64 / (n - attack) as f64
        };
        let x = filter.process(shape.waveform.sample(phase));
        out.push((x * amp * f64::from(gain)).clamp(-1.0, 1.0) as f32);
        phase = (phase + exp_sweep(shape.start_hz, shape.end_hz, f) / sr).rem_euclid(1.0);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/audio/whoosh.rs"]
mod tests;
