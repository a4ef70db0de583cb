use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::animation::style::StyleTag;
use crate::audio::clip::decode_clip;
use crate::audio::synth::{lfo_rate_for_seed, preset_by_id, render_preset};
use crate::audio::whoosh::{render_whoosh, whoosh_for_style};
use crate::audio::{AudioPcm, SAMPLE_RATE};
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Volume applied when a request does not set one.
pub const DEFAULT_VOLUME: f32 = 0.9;

/// Which sound accompanies an export. At most one per request.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    /// Silent export.
    #[default]
    None,
    /// Built-in synth preset id, e.g. `preset_12`.
    Preset(String),
    /// Style-dependent sweep.
    Whoosh,
    /// User-supplied audio file.
    Clip(PathBuf),
}

/// Sound selection plus its volume.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SoundSpec {
    /// What plays.
    pub kind: SoundKind,
    /// Linear gain in `[0, 1]`.
    pub volume: f32,
}

impl Default for SoundSpec {
    fn default() -> Self {
        Self {
            kind: SoundKind::None,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SoundSpec {
    /// No sound.
    pub fn none() -> Self {
        Self::default()
    }

    /// Built-in preset at the default volume.
    pub fn preset(id: impl Into<String>) -> Self {
        Self {
            kind: SoundKind::Preset(id.into()),
            ..Self::default()
        }
    }

    /// True when no sound is selected.
    pub fn is_none(&self) -> bool {
        self.kind == SoundKind::None
    }

    /// Check the volume range and that a preset id exists.
    pub fn validate(&self) -> KinetypeResult<()> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(KinetypeError::validation("sound volume must be in [0, 1]"));
        }
        if let SoundKind::Preset(id) = &self.kind
            && preset_by_id(id).is_none()
        {
            return Err(KinetypeError::validation(format!(
                "unknown synth preset '{id}'"
            )));
        }
        Ok(())
    }
}

/// Export facts the sound layer depends on.
#[derive(Clone, Copy, Debug)]
pub struct SoundContext {
    /// Animation style, for whoosh direction.
    pub style: StyleTag,
    /// Tone duration in seconds.
    pub duration_secs: f64,
    /// Seed for the synth LFO rate.
    pub seed: u64,
}

/// Preview tap receiving the same PCM that goes into the export.
pub trait AudioMonitor {
    /// Receive the rendered soundtrack.
    fn deliver(&mut self, pcm: &AudioPcm) -> KinetypeResult<()>;
}

/// Monitor writing a 32-bit float WAV file.
#[derive(Clone, Debug)]
pub struct WavMonitor {
    path: PathBuf,
}

impl WavMonitor {
    /// Monitor writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioMonitor for WavMonitor {
    fn deliver(&mut self, pcm: &AudioPcm) -> KinetypeResult<()> {
        write_wav(pcm, &self.path)
    }
}

/// Write `pcm` as a 32-bit float WAV file.
pub fn write_wav(pcm: &AudioPcm, path: &Path) -> KinetypeResult<()> {
    ensure_parent_dir(path)?;
    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| KinetypeError::audio(format!("create wav '{}': {e}", path.display())))?;
    for &s in &pcm.interleaved_f32 {
        writer
            .write_sample(s)
            .map_err(|e| KinetypeError::audio(format!("write wav sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| KinetypeError::audio(format!("finalize wav: {e}")))
}

/// Write interleaved samples as raw little-endian `f32` (ffmpeg `-f f32le` input).
pub fn write_f32le(samples_interleaved: &[f32], path: &Path) -> KinetypeResult<()> {
    ensure_parent_dir(path)?;
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(path, bytes)
        .with_context(|| format!("write raw audio '{}'", path.display()))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> KinetypeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Renders the soundtrack of an export and routes it to capture and monitor.
///
/// Created lazily by the studio and reused across exports.
pub struct AudioEngine {
    sample_rate: u32,
    monitor: Option<Box<dyn AudioMonitor>>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("sample_rate", &self.sample_rate)
            .field("monitor", &self.monitor.is_some())
            .finish()
    }
}

impl AudioEngine {
    /// Engine at [`SAMPLE_RATE`] without a monitor.
    pub fn new() -> Self {
        Self::with_sample_rate(SAMPLE_RATE)
    }

    /// Engine at a custom rate.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            monitor: None,
        }
    }

    /// Attach a preview tap.
    pub fn set_monitor(&mut self, monitor: Option<Box<dyn AudioMonitor>>) {
        self.monitor = monitor;
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Render `spec` to stereo PCM. `Ok(None)` for no sound.
    pub fn render(&self, spec: &SoundSpec, ctx: &SoundContext) -> KinetypeResult<Option<AudioPcm>> {
        spec.validate()?;
        let mono = match &spec.kind {
            SoundKind::None => return Ok(None),
            SoundKind::Preset(id) => {
                let preset = preset_by_id(id).ok_or_else(|| {
                    KinetypeError::audio(format!("unknown synth preset '{id}'"))
                })?;
                render_preset(
                    &preset,
                    ctx.duration_secs,
                    spec.volume,
                    lfo_rate_for_seed(ctx.seed),
                    self.sample_rate,
                )
            }
            SoundKind::Whoosh => render_whoosh(
                &whoosh_for_style(ctx.style),
                spec.volume,
                self.sample_rate,
            ),
            SoundKind::Clip(path) => {
                let mut pcm = decode_clip(path, self.sample_rate)?;
                pcm.apply_gain(spec.volume);
                return Ok(Some(pcm));
            }
        };
        Ok(Some(AudioPcm::stereo_from_mono(&mono, self.sample_rate)))
    }

    /// Render and route to the monitor; any failure is logged and yields silence.
    #[tracing::instrument(skip(self, spec, ctx), fields(sound = ?spec.kind))]
    pub fn render_for_export(&mut self, spec: &SoundSpec, ctx: &SoundContext) -> Option<AudioPcm> {
        let pcm = match self.render(spec, ctx) {
            Ok(Some(pcm)) => pcm,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "sound unavailable, exporting silent video");
                return None;
            }
        };
        if let Some(monitor) = self.monitor.as_mut()
            && let Err(e) = monitor.deliver(&pcm)
        {
            tracing::warn!(error = %e, "audio monitor failed");
        }
        tracing::debug!(secs = pcm.duration_secs(), "soundtrack rendered");
        Some(pcm)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/engine.rs"]
mod tests;
