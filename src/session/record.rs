use crate::encode::format::ContainerFormat;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::render::FrameRGBA;

/// Lifecycle of a recording session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Created, recorder not started.
    Idle,
    /// Accepting frames.
    Recording,
    /// No more frames accepted; waiting for the recorder to flush.
    Stopping,
    /// All chunks collected (or the session was cancelled).
    Finalized,
}

impl RecordState {
    /// True when moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: RecordState) -> bool {
        use RecordState::*;
        matches!(
            (self, next),
            (Idle, Recording)
                | (Recording, Stopping)
                | (Recording, Finalized)
                | (Stopping, Finalized)
        )
    }
}

/// Chunks collected by a finished session.
#[derive(Debug, Clone)]
pub struct CapturedRecording {
    /// Container chunks in arrival order.
    pub chunks: Vec<Vec<u8>>,
    /// Container of the chunks.
    pub format: ContainerFormat,
    /// Frames the recorder accepted.
    pub frames: u64,
    /// True when the session stopped early after a recorder error.
    pub partial: bool,
}

/// One recording: borrows the sink, accumulates its chunks and enforces the state machine.
pub struct RecordingSession<'s> {
    sink: &'s mut dyn FrameSink,
    format: ContainerFormat,
    state: RecordState,
    chunks: Vec<Vec<u8>>,
    frames: u64,
    failure: Option<String>,
}

impl std::fmt::Debug for RecordingSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("format", &self.format)
            .field("state", &self.state)
            .field("chunks", &self.chunks.len())
            .field("frames", &self.frames)
            .field("failure", &self.failure)
            .finish()
    }
}

impl<'s> RecordingSession<'s> {
    /// Start the recorder. On failure the sink is torn down and no session exists.
    pub fn start(sink: &'s mut dyn FrameSink, cfg: SinkConfig) -> KinetypeResult<Self> {
        let format = cfg.format;
        if !sink.supports(format) {
            return Err(KinetypeError::unsupported(format!(
                "recorder cannot produce {format}"
            )));
        }
        let mut session = Self {
            sink,
            format,
            state: RecordState::Idle,
            chunks: Vec::new(),
            frames: 0,
            failure: None,
        };
        if let Err(e) = session.sink.begin(cfg) {
            session.sink.abort();
            if e.is_precondition() {
                return Err(e);
            }
            return Err(KinetypeError::unsupported(format!(
                "recorder failed to start: {e}"
            )));
        }
        session.transition(RecordState::Recording)?;
        tracing::debug!(format = %format, "recording started");
        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Container being recorded.
    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Frames accepted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Chunks collected so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Recorder error that stopped the session, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn transition(&mut self, next: RecordState) -> KinetypeResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(KinetypeError::recording(format!(
                "illegal recording transition {:?} -> {:?}",
                self.state, next
            )));
        }
        tracing::trace!(from = ?self.state, to = ?next, "recording state");
        self.state = next;
        Ok(())
    }

    fn collect(&mut self) {
        let ready = self.sink.take_chunks();
        self.chunks.extend(ready.into_iter().filter(|c| !c.is_empty()));
    }

    /// Hand one frame to the recorder.
    ///
    /// A recorder error moves the session to `Stopping`; later pushes are refused and
    /// [`RecordingSession::stop`] finalizes whatever was captured.
    pub fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        if self.state != RecordState::Recording {
            return Err(KinetypeError::recording(format!(
                "cannot push frames while {:?}",
                self.state
            )));
        }
        match self.sink.push_frame(idx, frame) {
            Ok(()) => {
                self.frames += 1;
                self.collect();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, frame = idx.0, "recorder failed mid-session");
                self.failure = Some(e.to_string());
                self.collect();
                self.transition(RecordState::Stopping)?;
                Err(KinetypeError::recording(e.to_string()))
            }
        }
    }

    /// Stop accepting frames after a failure outside the recorder.
    pub fn fail(&mut self, reason: impl Into<String>) -> KinetypeResult<()> {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "recording interrupted");
        self.failure.get_or_insert(reason);
        self.collect();
        if self.state == RecordState::Recording {
            self.transition(RecordState::Stopping)?;
        }
        Ok(())
    }

    /// Stop the recorder and collect every chunk.
    ///
    /// After a mid-session failure the captured chunks are returned marked partial; with nothing
    /// captured the failure is returned as a `Recording` error.
    pub fn stop(mut self) -> KinetypeResult<CapturedRecording> {
        if self.state == RecordState::Recording {
            self.transition(RecordState::Stopping)?;
        }
        match self.sink.end() {
            Ok(rest) => self
                .chunks
                .extend(rest.into_iter().filter(|c| !c.is_empty())),
            Err(e) => {
                tracing::warn!(error = %e, "recorder failed while stopping");
                self.failure.get_or_insert_with(|| e.to_string());
            }
        }
        self.transition(RecordState::Finalized)?;

        let partial = self.failure.is_some();
        if self.chunks.is_empty() {
            let reason = self
                .failure
                .take()
                .unwrap_or_else(|| "recorder produced no data".to_owned());
            return Err(KinetypeError::recording(reason));
        }
        tracing::debug!(
            chunks = self.chunks.len(),
            frames = self.frames,
            partial,
            "recording stopped"
        );
        Ok(CapturedRecording {
            chunks: std::mem::take(&mut self.chunks),
            format: self.format,
            frames: self.frames,
            partial,
        })
    }

    /// Abort the recorder and discard everything captured.
    pub fn cancel(mut self) -> KinetypeError {
        self.sink.abort();
        self.chunks.clear();
        self.state = RecordState::Finalized;
        tracing::info!(frames = self.frames, "recording cancelled");
        KinetypeError::Cancelled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/record.rs"]
mod tests;
