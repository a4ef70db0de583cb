//! Kinetype renders chroma-key text and image animations to video.
//!
//! A request names the content (a text line or an image), one of the animation styles, text
//! options and an optional soundtrack. The [`Studio`] turns it into frames on a green
//! `#00ff00` surface, streams them into a [`FrameSink`] and finalizes the recorded container:
//!
//! - Parse and validate an [`AnimationRequest`]
//! - Create a [`Studio`] (raster surface and audio engine are created lazily and reused)
//! - [`Studio::export`] into an [`FfmpegSink`] (or [`InMemorySink`] in tests)
//! - Optionally transcode the result with an [`FfmpegTranscoder`]
#![forbid(unsafe_code)]

mod foundation;

/// Easing, per-style transforms, font flicker and frame timing.
pub mod animation;
pub mod assets;
pub mod audio;
/// Text/image content selection and placeholders.
pub mod content;
/// Frame sinks and container formats.
pub mod encode;
pub mod render;
/// User requests and their validation.
pub mod request;
/// Recording sessions, export finalization and the studio.
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{KinetypeError, KinetypeResult};

pub use crate::animation::ease::{Ease, ease_out_cubic};
pub use crate::animation::style::{FadeSpeed, StyleTag};
pub use crate::animation::timeline::{Pacing, Timeline};
pub use crate::assets::fonts::FontBook;
pub use crate::audio::engine::{SoundKind, SoundSpec};
pub use crate::content::{ContentMode, ImageRef};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, FfmpegTranscoder};
pub use crate::encode::format::ContainerFormat;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::{FrameCompositor, FrameRGBA, FrameReport};
pub use crate::request::AnimationRequest;
pub use crate::session::export::{ExportedFile, Transcoder};
pub use crate::session::studio::{CancelToken, ExportOptions, ExportOutcome, RenderStats, Studio};
