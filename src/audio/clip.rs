use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::audio::AudioPcm;
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Decode an uploaded clip to stereo `f32` at `sample_rate`.
///
/// WAV files are read in-process; anything else goes through the system `ffmpeg`.
pub fn decode_clip(path: &Path, sample_rate: u32) -> KinetypeResult<AudioPcm> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read audio clip '{}'", path.display()))?;
    if is_wav(&bytes) {
        return decode_wav(&bytes, sample_rate);
    }
    decode_with_ffmpeg(path, sample_rate)
}

fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode WAV bytes to stereo `f32` at `sample_rate`.
pub fn decode_wav(bytes: &[u8], sample_rate: u32) -> KinetypeResult<AudioPcm> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| KinetypeError::audio(format!("failed to read wav: {e}")))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| KinetypeError::audio(format!("failed to read wav samples: {e}")))?,
        hound::SampleFormat::Int => {
            let max = 1i64
                .checked_shl(u32::from(spec.bits_per_sample).saturating_sub(1))
                .filter(|_| spec.bits_per_sample <= 32)
                .ok_or_else(|| {
                    KinetypeError::audio(format!(
                        "unsupported wav bits_per_sample {}",
                        spec.bits_per_sample
                    ))
                })? as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()
                .map_err(|e| KinetypeError::audio(format!("failed to read wav samples: {e}")))?
        }
    };

    let stereo = to_stereo(&samples, channels);
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: resample_stereo_linear(&stereo, spec.sample_rate, sample_rate),
    })
}

fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        2 => samples.to_vec(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Linear-interpolation resampler over interleaved stereo.
fn resample_stereo_linear(src: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || src.len() < 4 {
        return src.to_vec();
    }
    let src_frames = src.len() / 2;
    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_frames = ((src_frames as f64) / ratio).floor() as usize;

    let mut out = Vec::with_capacity(out_frames * 2);
    for i in 0..out_frames {
        let pos = i as f64 * ratio;
        let i0 = (pos.floor() as usize).min(src_frames - 1);
        let i1 = (i0 + 1).min(src_frames - 1);
        let frac = (pos - i0 as f64) as f32;
        for c in 0..2 {
            let a = src[i0 * 2 + c];
            let b = src[i1 * 2 + c];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

fn decode_with_ffmpeg(path: &Path, sample_rate: u32) -> KinetypeResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| KinetypeError::audio(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(KinetypeError::audio(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(KinetypeError::audio(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/clip.rs"]
mod tests;
