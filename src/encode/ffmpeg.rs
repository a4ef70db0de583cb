use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::Context;

use crate::encode::format::{ContainerFormat, FfmpegCodecProbe};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Rgba8};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::FrameRGBA;
use crate::session::export::{ExportedFile, Transcoder};

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Background used to flatten alpha.
    pub bg: Rgba8,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,
    /// Target audio bitrate in bits per second.
    pub audio_bitrate: u32,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            bg: Rgba8::CHROMA_GREEN,
            video_bitrate: 8_000_000,
            audio_bitrate: 128_000,
        }
    }
}

/// Sink that spawns the system `ffmpeg`, streams raw frames to its stdin and collects the
/// container it writes to stdout as chunks.
///
/// Audio is optional and provided through `SinkConfig.audio`.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    probe: FfmpegCodecProbe,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    chunks_rx: Option<mpsc::Receiver<Vec<u8>>>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("encoders", &self.probe.len())
            .field("running", &self.child.is_some())
            .finish()
    }
}

impl FfmpegSink {
    /// Sink probing the installed ffmpeg for encoders.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self::with_probe(opts, FfmpegCodecProbe::detect())
    }

    /// Sink using an already collected encoder listing.
    pub fn with_probe(opts: FfmpegSinkOpts, probe: FfmpegCodecProbe) -> Self {
        Self {
            opts,
            probe,
            child: None,
            stdin: None,
            chunks_rx: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn build_command(&self, cfg: &SinkConfig) -> KinetypeResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened before writing (ffmpeg does not understand premul).
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let audio = match (&cfg.audio, cfg.format.audio_encoder()) {
            (Some(audio), Some(encoder)) => {
                if audio.sample_rate == 0 || audio.channels == 0 {
                    return Err(KinetypeError::validation(
                        "audio sample_rate/channels must be non-zero when audio is enabled",
                    ));
                }
                cmd.args([
                    "-f",
                    "f32le",
                    "-ar",
                    &audio.sample_rate.to_string(),
                    "-ac",
                    &audio.channels.to_string(),
                    "-i",
                ])
                .arg(&audio.path);
                Some(encoder)
            }
            _ => None,
        };

        cmd.args(["-map", "0:v", "-c:v", cfg.format.video_encoder()]);
        cmd.args(["-pix_fmt", "yuv420p"]);
        cmd.args(["-b:v", &self.opts.video_bitrate.to_string()]);
        match cfg.format.video_encoder() {
            "libx264" => {
                cmd.args(["-preset", "veryfast"]);
            }
            _ => {
                cmd.args(["-deadline", "realtime", "-cpu-used", "8"]);
            }
        }

        if let Some(encoder) = audio {
            cmd.args(["-map", "1:a", "-c:a", encoder]);
            cmd.args(["-b:a", &self.opts.audio_bitrate.to_string()]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(["-f", cfg.format.muxer()]);
        if cfg.format == ContainerFormat::Mp4H264Aac {
            // A seekable moov atom is impossible on a pipe.
            cmd.args(["-movflags", "frag_keyframe+empty_moov"]);
        }
        cmd.arg("pipe:1");
        Ok(cmd)
    }

    fn join_drains(&mut self) -> KinetypeResult<Vec<u8>> {
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| KinetypeError::recording("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| KinetypeError::recording(format!("ffmpeg stdout read failed: {e}")))?;
        }
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| KinetypeError::recording("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| KinetypeError::recording(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn supports(&self, format: ContainerFormat) -> bool {
        format.is_supported_by(&self.probe)
    }

    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(KinetypeError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(KinetypeError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(KinetypeError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(KinetypeError::unsupported(
                "ffmpeg is required for recording, but was not found on PATH",
            ));
        }
        if !self.supports(cfg.format) {
            return Err(KinetypeError::unsupported(format!(
                "ffmpeg cannot encode {}",
                cfg.format
            )));
        }

        let mut cmd = self.build_command(&cfg)?;
        tracing::debug!(format = %cfg.format, audio = cfg.audio.is_some(), "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            KinetypeError::unsupported(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| KinetypeError::recording("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| KinetypeError::recording("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| KinetypeError::recording("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if tx.send(buf[..n].to_vec()).is_err() {
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.chunks_rx = Some(rx);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| KinetypeError::recording("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(KinetypeError::recording(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KinetypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(KinetypeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg.to_premul(),
            )?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(KinetypeError::recording("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            KinetypeError::recording(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        match self.chunks_rx.as_ref() {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    fn end(&mut self) -> KinetypeResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| KinetypeError::recording("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            KinetypeError::recording(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.join_drains()?;
        let chunks = self.take_chunks();
        self.chunks_rx = None;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(KinetypeError::recording(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(chunks)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "ffmpeg already exited");
            }
            let _ = child.wait();
        }
        if let Err(e) = self.join_drains() {
            tracing::debug!(error = %e, "ffmpeg drain after abort");
        }
        self.chunks_rx = None;
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Transcoder re-encoding an export through the system `ffmpeg`.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegTranscoder {
    target: ContainerFormat,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            target: ContainerFormat::Mp4H264Aac,
        }
    }
}

impl FfmpegTranscoder {
    /// Transcoder to MP4 (H.264 + AAC).
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcoder to another container.
    pub fn to_format(target: ContainerFormat) -> Self {
        Self { target }
    }
}

impl Transcoder for FfmpegTranscoder {
    #[tracing::instrument(skip_all, fields(from = %input.format, to = %self.target))]
    fn transcode(&self, input: &ExportedFile) -> KinetypeResult<ExportedFile> {
        if !is_ffmpeg_on_path() {
            return Err(KinetypeError::transcode(
                "ffmpeg is required for transcoding, but was not found on PATH",
            ));
        }
        let dir = tempfile::tempdir().context("create transcode scratch directory")?;
        let in_path = dir
            .path()
            .join(format!("input.{}", input.format.extension()));
        let out_path = dir
            .path()
            .join(format!("output.{}", self.target.extension()));
        std::fs::write(&in_path, &input.bytes)
            .with_context(|| format!("write transcode input '{}'", in_path.display()))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(&in_path)
            .args(["-c:v", self.target.video_encoder(), "-pix_fmt", "yuv420p"]);
        match self.target.audio_encoder() {
            Some(a) => {
                cmd.args(["-c:a", a]);
            }
            None => {
                cmd.arg("-an");
            }
        }
        if self.target == ContainerFormat::Mp4H264Aac {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&out_path);

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| KinetypeError::transcode(format!("failed to spawn ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KinetypeError::transcode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = std::fs::read(&out_path)
            .with_context(|| format!("read transcode output '{}'", out_path.display()))?;
        tracing::info!(bytes = bytes.len(), "transcoded export");
        Ok(ExportedFile {
            file_name: input.file_name_for(self.target),
            bytes,
            format: self.target,
        })
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_premul: [u8; 4],
) -> KinetypeResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(KinetypeError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_premul[0]);
    let bg_g = u16::from(bg_premul[1]);
    let bg_b = u16::from(bg_premul[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
