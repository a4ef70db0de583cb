//! Frame sinks turning composed frames into container chunks.

pub mod ffmpeg;
pub mod format;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, FfmpegTranscoder, is_ffmpeg_on_path};
pub use format::{CodecProbe, ContainerFormat, FfmpegCodecProbe, FixedCodecProbe, select_format};
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig, preferred_format};
