use std::path::PathBuf;

use crate::encode::format::{ContainerFormat, FixedCodecProbe, first_supported};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::render::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when a recording starts.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Container to produce.
    pub format: ContainerFormat,
    /// Optional raw PCM soundtrack.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode sound.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Recorder contract: consumes frames in timeline order and hands back encoded container chunks.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. Chunks
/// concatenated in the order they were returned (by `take_chunks` and then `end`) form the
/// complete container file.
pub trait FrameSink: Send {
    /// True when this sink can produce `format`.
    fn supports(&self, format: ContainerFormat) -> bool;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()>;
    /// Chunks that became available since the last call. Never blocks.
    fn take_chunks(&mut self) -> Vec<Vec<u8>>;
    /// Flush the encoder and return the remaining chunks.
    fn end(&mut self) -> KinetypeResult<Vec<Vec<u8>>>;
    /// Tear down without finalizing; pending output is discarded.
    fn abort(&mut self);
}

/// First format of [`ContainerFormat::PREFERENCE`] the sink can record.
pub fn preferred_format(sink: &dyn FrameSink) -> KinetypeResult<ContainerFormat> {
    first_supported(|f| sink.supports(f))
}

/// In-memory sink for tests and debugging.
///
/// Every pushed frame becomes one chunk holding its raw bytes, so the "container" is the frames
/// laid end to end. Failures can be injected at start or after a number of frames.
#[derive(Debug)]
pub struct InMemorySink {
    probe: FixedCodecProbe,
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    pending: Vec<Vec<u8>>,
    fail_on_begin: bool,
    fail_after: Option<usize>,
    aborted: bool,
    ended: bool,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self {
            probe: FixedCodecProbe::all(),
            cfg: None,
            frames: Vec::new(),
            pending: Vec::new(),
            fail_on_begin: false,
            fail_after: None,
            aborted: false,
            ended: false,
        }
    }
}

impl InMemorySink {
    /// Sink supporting every container format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the formats the sink claims to support.
    pub fn with_probe(mut self, probe: FixedCodecProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Make `begin` fail.
    pub fn failing_on_begin(mut self) -> Self {
        self.fail_on_begin = true;
        self
    }

    /// Make `push_frame` fail once `frames` frames were accepted.
    pub fn failing_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// True once `abort` ran.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    /// True once `end` completed.
    pub fn was_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn supports(&self, format: ContainerFormat) -> bool {
        format.is_supported_by(&self.probe)
    }

    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        if self.fail_on_begin {
            return Err(KinetypeError::recording("in-memory sink refused to start"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        self.pending.clear();
        self.aborted = false;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| KinetypeError::recording("in-memory sink not started"))?;
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(KinetypeError::recording("in-memory sink failure injected"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(KinetypeError::recording(
                "in-memory sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KinetypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.pending.push(frame.data.clone());
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending)
    }

    fn end(&mut self) -> KinetypeResult<Vec<Vec<u8>>> {
        if self.cfg.is_none() {
            return Err(KinetypeError::recording("in-memory sink not started"));
        }
        self.ended = true;
        Ok(std::mem::take(&mut self.pending))
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.pending.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
