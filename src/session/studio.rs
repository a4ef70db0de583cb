use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Context;

use crate::animation::flicker::{FlickerFonts, FlickerSchedule};
use crate::animation::style::StyleTag;
use crate::animation::timeline::{Pacing, Timeline};
use crate::assets::fonts::FontBook;
use crate::audio::AudioPcm;
use crate::audio::engine::{AudioEngine, AudioMonitor, SoundContext, write_f32le};
use crate::encode::format::ContainerFormat;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig, preferred_format};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::render::{FrameCompositor, FrameRGBA, FrameReport};
use crate::request::AnimationRequest;
use crate::session::export::{DEFAULT_BASE_NAME, ExportFinalizer, ExportedFile, Transcoder};
use crate::session::record::RecordingSession;

/// Default trailing pad so the sound tail is not cut off.
pub const DEFAULT_TAIL_PAD_MS: u32 = 300;

/// Cooperative cancellation shared between the exporting thread and a controller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the export stops before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs of one export that are not part of the animation itself.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Fixed-step (as fast as possible) or wall-clock paced frame production.
    pub pacing: Pacing,
    /// Repeat the final frame for this long after the animation.
    pub tail_pad_ms: u32,
    /// Delay the soundtrack relative to the first frame.
    pub audio_lead_in_ms: u32,
    /// Exported file name prefix.
    pub base_name: String,
    /// Directory the files are written to; nothing is written when unset.
    pub out_dir: Option<PathBuf>,
    /// Force a container instead of the preferred one.
    pub format: Option<ContainerFormat>,
    /// Run the studio transcoder after recording.
    pub transcode: bool,
    /// Cancellation token checked before every frame.
    pub cancel: Option<CancelToken>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pacing: Pacing::FixedStep,
            tail_pad_ms: DEFAULT_TAIL_PAD_MS,
            audio_lead_in_ms: 0,
            base_name: DEFAULT_BASE_NAME.to_owned(),
            out_dir: None,
            format: None,
            transcode: false,
            cancel: None,
        }
    }
}

/// Counters of one export.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RenderStats {
    /// Animation frames drawn.
    pub frames_composed: u64,
    /// Copies of the final frame appended as tail pad.
    pub frames_padded: u64,
    /// Frames the recorder accepted.
    pub frames_recorded: u64,
    /// Distinct fonts shown by the font-flicker style.
    pub flicker_swaps: u64,
    /// Soundtrack length handed to the recorder.
    pub audio_secs: Option<f64>,
    /// Wall time of the export.
    pub elapsed_ms: u64,
}

/// Everything an export produced.
#[derive(Debug)]
pub struct ExportOutcome {
    /// The recorded file.
    pub primary: ExportedFile,
    /// Transcoded copy, when requested and successful.
    pub transcoded: Option<ExportedFile>,
    /// Why a requested transcode is missing.
    pub degraded: Option<String>,
    /// True when recording stopped early after an error.
    pub partial: bool,
    /// Paths written to `ExportOptions::out_dir`.
    pub saved: Vec<PathBuf>,
    /// Report of the first animation frame.
    pub first_frame: Option<FrameReport>,
    /// Report of the last animation frame.
    pub last_frame: Option<FrameReport>,
    /// Counters.
    pub stats: RenderStats,
}

/// Owner of the shared raster surface and audio engine.
///
/// Both are created on first use and reused by later exports; a canvas size change recreates the
/// surface. `export` takes `&mut self`, so two exports can never draw on the same surface.
pub struct Studio {
    fonts: Option<FontBook>,
    compositor: Option<FrameCompositor>,
    audio: Option<AudioEngine>,
    monitor: Option<Box<dyn AudioMonitor>>,
    transcoder: Option<Box<dyn Transcoder>>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("canvas", &self.compositor.as_ref().map(|c| c.canvas()))
            .field("audio", &self.audio)
            .field("transcoder", &self.transcoder.is_some())
            .finish()
    }
}

impl Studio {
    /// Studio loading system fonts on first use.
    pub fn new() -> Self {
        Self {
            fonts: None,
            compositor: None,
            audio: None,
            monitor: None,
            transcoder: None,
        }
    }

    /// Studio drawing with `fonts` only.
    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            fonts: Some(fonts),
            ..Self::new()
        }
    }

    /// Transcoder used by exports with `ExportOptions::transcode`.
    pub fn set_transcoder(&mut self, transcoder: Option<Box<dyn Transcoder>>) {
        self.transcoder = transcoder;
    }

    /// Preview tap receiving every rendered soundtrack.
    pub fn set_audio_monitor(&mut self, monitor: Option<Box<dyn AudioMonitor>>) {
        match self.audio.as_mut() {
            Some(engine) => engine.set_monitor(monitor),
            None => self.monitor = monitor,
        }
    }

    /// Canvas of the current raster surface, if one exists.
    pub fn surface_canvas(&self) -> Option<Canvas> {
        self.compositor.as_ref().map(|c| c.canvas())
    }

    fn compositor_for(&mut self, canvas: Canvas) -> KinetypeResult<&mut FrameCompositor> {
        let compositor = match self.compositor.take() {
            Some(c) if c.canvas() == canvas => c,
            Some(old) => {
                tracing::debug!(
                    width = canvas.width,
                    height = canvas.height,
                    "canvas changed, recreating raster surface"
                );
                FrameCompositor::new(canvas, old.into_fonts())?
            }
            None => {
                let fonts = self
                    .fonts
                    .take()
                    .unwrap_or_else(FontBook::with_system_fonts);
                FrameCompositor::new(canvas, fonts)?
            }
        };
        Ok(self.compositor.insert(compositor))
    }

    fn audio_engine(&mut self) -> &mut AudioEngine {
        let monitor = &mut self.monitor;
        self.audio.get_or_insert_with(|| {
            let mut engine = AudioEngine::new();
            engine.set_monitor(monitor.take());
            engine
        })
    }

    /// Draw one still frame at `progress`; missing content becomes a placeholder.
    pub fn preview_frame(
        &mut self,
        req: &AnimationRequest,
        progress: f64,
    ) -> KinetypeResult<(FrameRGBA, FrameReport)> {
        let resolved = req.resolve_preview()?;
        let flicker_font = if resolved.style == StyleTag::FontFlicker {
            let mut pool = FlickerFonts::new(req.flicker_pool(), req.seed)?;
            Some(pool.next_font().to_owned())
        } else {
            None
        };
        let compositor = self.compositor_for(resolved.canvas())?;
        let report = compositor.compose(progress, &resolved, flicker_font.as_deref())?;
        Ok((compositor.snapshot(), report))
    }

    /// Render the request's soundtrack; errors are returned, not swallowed.
    pub fn render_sound(&mut self, req: &AnimationRequest) -> KinetypeResult<Option<AudioPcm>> {
        req.validate()?;
        let ctx = SoundContext {
            style: req.style,
            duration_secs: req.duration_secs,
            seed: req.seed,
        };
        self.audio_engine().render(&req.sound, &ctx)
    }

    /// Record `req` into `sink` and finalize the file.
    ///
    /// Preconditions (valid request, content present, a container the sink can record) are
    /// checked before anything is allocated. Sound and transcoding are best-effort. A recorder
    /// error mid-way yields a partial file when any data was captured.
    #[tracing::instrument(
        skip_all,
        fields(style = req.style.as_str(), content = ?req.content, secs = req.duration_secs)
    )]
    pub fn export(
        &mut self,
        req: &AnimationRequest,
        sink: &mut dyn FrameSink,
        opts: &ExportOptions,
    ) -> KinetypeResult<ExportOutcome> {
        let started = Instant::now();
        let resolved = req.resolve()?;
        let format = match opts.format {
            Some(f) if sink.supports(f) => f,
            Some(f) => {
                return Err(KinetypeError::unsupported(format!(
                    "recorder cannot produce {f}"
                )));
            }
            None => preferred_format(sink)?,
        };
        if is_cancelled(opts) {
            return Err(KinetypeError::Cancelled);
        }

        let timeline = Timeline::new(req.duration_secs, req.fps, opts.pacing)?;
        let total = timeline.total_frames();
        let pad = req
            .fps
            .secs_to_frames_round(f64::from(opts.tail_pad_ms) / 1000.0);
        let video_secs = req.fps.frames_to_secs(total + pad);
        let mut stats = RenderStats::default();

        // Kept alive until the recorder has consumed the soundtrack.
        let scratch = tempfile::tempdir().context("create export scratch directory")?;
        let audio = self.prepare_audio(req, format, opts, video_secs, &scratch)?;
        stats.audio_secs = audio.as_ref().map(|(_, secs)| *secs);

        let mut flicker = if resolved.style == StyleTag::FontFlicker {
            let pool = FlickerFonts::new(req.flicker_pool(), req.seed)?;
            Some(FlickerSchedule::new(pool, req.flicker_interval())?)
        } else {
            None
        };

        let cfg = SinkConfig {
            width: resolved.canvas().width,
            height: resolved.canvas().height,
            fps: req.fps,
            format,
            audio: audio.map(|(cfg, _)| cfg),
        };
        let compositor = self.compositor_for(resolved.canvas())?;
        let mut session = RecordingSession::start(sink, cfg)?;
        tracing::info!(format = %format, frames = total, pad, "export started");

        let mut first_frame = None;
        let mut last_frame = None;
        let mut last_tick = None;
        let mut next_index = 0u64;
        for tick in timeline {
            if is_cancelled(opts) {
                return Err(session.cancel());
            }
            let font = flicker.as_mut().map(|s| {
                let tick_no = match opts.pacing {
                    Pacing::FixedStep => s.tick_for_frame(tick.index.0, req.fps),
                    Pacing::WallClock => s.tick_at(tick.elapsed_secs),
                };
                if last_tick != Some(tick_no) {
                    last_tick = Some(tick_no);
                    stats.flicker_swaps += 1;
                }
                s.font_for_tick(tick_no)
            });
            let report = match compositor.compose(tick.progress, &resolved, font) {
                Ok(r) => r,
                Err(e) => {
                    session.fail(format!("frame {} failed: {e}", tick.index.0))?;
                    break;
                }
            };
            stats.frames_composed += 1;
            if first_frame.is_none() {
                first_frame = Some(report.clone());
            }
            last_frame = Some(report);
            next_index = tick.index.0 + 1;
            if session.push_frame(tick.index, compositor.frame()).is_err() {
                break;
            }
        }

        if session.failure().is_none() {
            for k in 0..pad {
                if is_cancelled(opts) {
                    return Err(session.cancel());
                }
                if session
                    .push_frame(FrameIndex(next_index + k), compositor.frame())
                    .is_err()
                {
                    break;
                }
                stats.frames_padded += 1;
            }
        }

        stats.frames_recorded = session.frames();
        let captured = session.stop()?;
        let partial = captured.partial;
        let finalizer = ExportFinalizer::new(opts.base_name.clone());
        let primary = finalizer.finalize(captured)?;
        drop(scratch);

        let (transcoded, degraded) = match (opts.transcode, self.transcoder.as_deref()) {
            (false, _) => (None, None),
            (true, Some(t)) => {
                let out = finalizer.transcode_best_effort(&primary, t);
                (out.file, out.degraded)
            }
            (true, None) => {
                tracing::warn!("transcode requested but no transcoder is configured");
                (None, Some("no transcoder configured".to_owned()))
            }
        };

        let mut saved = Vec::new();
        if let Some(dir) = opts.out_dir.as_deref() {
            saved.push(primary.save_to(dir)?);
            if let Some(t) = transcoded.as_ref() {
                saved.push(t.save_to(dir)?);
            }
        }

        stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            file = %primary.file_name,
            bytes = primary.bytes.len(),
            frames = stats.frames_recorded,
            partial,
            elapsed_ms = stats.elapsed_ms,
            "export finished"
        );
        Ok(ExportOutcome {
            primary,
            transcoded,
            degraded,
            partial,
            saved,
            first_frame,
            last_frame,
            stats,
        })
    }

    /// Render the soundtrack, align it to the video and write it for the recorder.
    ///
    /// `Ok(None)` for silent exports, including every sound failure.
    fn prepare_audio(
        &mut self,
        req: &AnimationRequest,
        format: ContainerFormat,
        opts: &ExportOptions,
        video_secs: f64,
        scratch: &tempfile::TempDir,
    ) -> KinetypeResult<Option<(AudioInputConfig, f64)>> {
        if req.sound.is_none() {
            return Ok(None);
        }
        if !format.has_audio() {
            tracing::warn!(format = %format, "container has no audio track, exporting silent");
            return Ok(None);
        }
        let ctx = SoundContext {
            style: req.style,
            duration_secs: req.duration_secs,
            seed: req.seed,
        };
        let Some(mut pcm) = self.audio_engine().render_for_export(&req.sound, &ctx) else {
            return Ok(None);
        };
        pcm.delay(f64::from(opts.audio_lead_in_ms) / 1000.0);
        pcm.fit_to_secs(video_secs);

        let path = scratch.path().join("soundtrack.f32le");
        if let Err(e) = write_f32le(&pcm.interleaved_f32, &path) {
            tracing::warn!(error = %e, "could not stage soundtrack, exporting silent");
            return Ok(None);
        }
        Ok(Some((
            AudioInputConfig {
                path,
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            pcm.duration_secs(),
        )))
    }
}

fn is_cancelled(opts: &ExportOptions) -> bool {
    opts.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
