use std::collections::BTreeSet;
use std::process::{Command, Stdio};

use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Container/codec combinations an export can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// WebM with VP9 video and Opus audio.
    WebmVp9Opus,
    /// WebM with VP8 video and Opus audio.
    WebmVp8Opus,
    /// MP4 with H.264 video and AAC audio.
    Mp4H264Aac,
    /// WebM with VP8 video and no audio track.
    WebmVp8Silent,
}

impl ContainerFormat {
    /// Most preferred first.
    pub const PREFERENCE: [ContainerFormat; 4] = [
        ContainerFormat::WebmVp9Opus,
        ContainerFormat::WebmVp8Opus,
        ContainerFormat::Mp4H264Aac,
        ContainerFormat::WebmVp8Silent,
    ];

    /// MIME type with codec parameters.
    pub fn mime(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "video/webm;codecs=vp9,opus",
            Self::WebmVp8Opus => "video/webm;codecs=vp8,opus",
            Self::Mp4H264Aac => "video/mp4;codecs=avc1,mp4a",
            Self::WebmVp8Silent => "video/webm;codecs=vp8",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "mp4",
            _ => "webm",
        }
    }

    /// ffmpeg muxer name.
    pub fn muxer(self) -> &'static str {
        match self {
            Self::Mp4H264Aac => "mp4",
            _ => "webm",
        }
    }

    /// ffmpeg video encoder.
    pub fn video_encoder(self) -> &'static str {
        match self {
            Self::WebmVp9Opus => "libvpx-vp9",
            Self::WebmVp8Opus | Self::WebmVp8Silent => "libvpx",
            Self::Mp4H264Aac => "libx264",
        }
    }

    /// ffmpeg audio encoder, `None` for silent containers.
    pub fn audio_encoder(self) -> Option<&'static str> {
        match self {
            Self::WebmVp9Opus | Self::WebmVp8Opus => Some("libopus"),
            Self::Mp4H264Aac => Some("aac"),
            Self::WebmVp8Silent => None,
        }
    }

    /// True when the container carries a soundtrack.
    pub fn has_audio(self) -> bool {
        self.audio_encoder().is_some()
    }

    /// True when every encoder the format needs is available.
    pub fn is_supported_by(self, probe: &dyn CodecProbe) -> bool {
        probe.has_encoder(self.video_encoder())
            && self.audio_encoder().is_none_or(|a| probe.has_encoder(a))
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// Answers which encoders the host can run.
pub trait CodecProbe {
    /// True when the encoder named `name` (ffmpeg naming) is available.
    fn has_encoder(&self, name: &str) -> bool;
}

/// Probe backed by the output of `ffmpeg -encoders`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegCodecProbe {
    encoders: BTreeSet<String>,
}

impl FfmpegCodecProbe {
    /// Run `ffmpeg -encoders`; an empty probe when ffmpeg is missing or fails.
    pub fn detect() -> Self {
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let probe = Self::parse(&String::from_utf8_lossy(&out.stdout));
                tracing::debug!(encoders = probe.encoders.len(), "probed ffmpeg encoders");
                probe
            }
            Ok(out) => {
                tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "ffmpeg not available");
                Self::default()
            }
        }
    }

    /// Parse an encoder listing (`" V....D libx264   H.264 ..."` lines after the `------` rule).
    pub fn parse(listing: &str) -> Self {
        let mut encoders = BTreeSet::new();
        let mut in_table = false;
        for line in listing.lines() {
            let trimmed = line.trim();
            if !in_table {
                in_table = trimmed.starts_with("------");
                continue;
            }
            let mut cols = trimmed.split_whitespace();
            let (Some(flags), Some(name)) = (cols.next(), cols.next()) else {
                continue;
            };
            if flags.len() == 6 && matches!(flags.as_bytes()[0], b'V' | b'A' | b'S') {
                encoders.insert(name.to_owned());
            }
        }
        Self { encoders }
    }

    /// Number of known encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// True when nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl CodecProbe for FfmpegCodecProbe {
    fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }
}

/// Probe over a fixed encoder list.
#[derive(Clone, Debug, Default)]
pub struct FixedCodecProbe {
    encoders: BTreeSet<String>,
}

impl FixedCodecProbe {
    /// Probe reporting exactly `encoders`.
    pub fn new<I, S>(encoders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            encoders: encoders.into_iter().map(Into::into).collect(),
        }
    }

    /// Probe reporting every encoder any [`ContainerFormat`] needs.
    pub fn all() -> Self {
        Self::new(["libvpx-vp9", "libvpx", "libopus", "libx264", "aac"])
    }
}

impl CodecProbe for FixedCodecProbe {
    fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }
}

/// First format of [`ContainerFormat::PREFERENCE`] the probe supports.
pub fn select_format(probe: &dyn CodecProbe) -> KinetypeResult<ContainerFormat> {
    first_supported(|f| f.is_supported_by(probe))
}

pub(crate) fn first_supported(
    supported: impl Fn(ContainerFormat) -> bool,
) -> KinetypeResult<ContainerFormat> {
    ContainerFormat::PREFERENCE
        .into_iter()
        .find(|f| supported(*f))
        .ok_or_else(|| {
            KinetypeError::unsupported(
                "no supported container format (need libvpx, libvpx-vp9 or libx264 encoders)",
            )
        })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
