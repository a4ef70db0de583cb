//! Export orchestration: recording state machine, finalization and the studio.

pub mod export;
pub mod record;
pub mod studio;

pub use export::{ExportFinalizer, ExportedFile, TranscodeOutcome, Transcoder};
pub use record::{CapturedRecording, RecordState, RecordingSession};
pub use studio::{CancelToken, ExportOptions, ExportOutcome, RenderStats, Studio};
