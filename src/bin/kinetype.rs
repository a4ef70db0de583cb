use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use kinetype::audio::engine::{WavMonitor, write_wav};
use kinetype::audio::synth::presets;
use kinetype::{
    AnimationRequest, Canvas, ContainerFormat, ContentMode, ExportOptions, FadeSpeed, FfmpegSink,
    FfmpegSinkOpts, FfmpegTranscoder, Fps, ImageRef, Pacing, SoundKind, StyleTag, Studio,
};

#[derive(Parser, Debug)]
#[command(name = "kinetype", version, about = "Chroma-key kinetic text/image animations")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the animation to a video file (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the soundtrack alone as a WAV file.
    Sound(SoundArgs),
    /// List the built-in synth presets.
    Presets,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Request JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text to animate (switches to text mode).
    #[arg(long)]
    text: Option<String>,

    /// Image to animate (switches to image mode).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Content mode.
    #[arg(long)]
    content: Option<ContentMode>,

    /// Animation style (none, left, right, top, bottom, fade, zoom, rotate, bounce, wave,
    /// typewriter, font-flicker).
    #[arg(long)]
    style: Option<StyleTag>,

    /// Duration in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Text color.
    #[arg(long)]
    color: Option<String>,

    /// Drop shadow under text.
    #[arg(long)]
    shadow: bool,

    /// Colored glow around text.
    #[arg(long)]
    glow: bool,

    /// Font family.
    #[arg(long)]
    font: Option<String>,

    /// Fade speed (slow, normal, fast).
    #[arg(long)]
    fade_speed: Option<FadeSpeed>,

    /// Font-flicker interval in milliseconds.
    #[arg(long)]
    flicker_ms: Option<u32>,

    /// Synth preset id, e.g. `preset_12`.
    #[arg(long, conflicts_with_all = ["whoosh", "sound_clip"])]
    sound_preset: Option<String>,

    /// Style-dependent whoosh.
    #[arg(long, conflicts_with = "sound_clip")]
    whoosh: bool,

    /// Audio file to use as soundtrack.
    #[arg(long)]
    sound_clip: Option<PathBuf>,

    /// Sound volume in [0, 1].
    #[arg(long)]
    volume: Option<f32>,

    /// Canvas width.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height.
    #[arg(long)]
    height: Option<u32>,

    /// Seed for the flicker pool and synth LFO.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// File name prefix.
    #[arg(long, default_value = "animation_export")]
    base_name: String,

    /// Container format; the best supported one when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Also write a transcoded copy, MP4 (H.264/AAC) unless a format is given.
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "mp4")]
    transcode: Option<FormatChoice>,

    /// Also write the soundtrack to this WAV file while exporting.
    #[arg(long)]
    monitor_wav: Option<PathBuf>,

    /// Pace frames on the wall clock instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Trailing pad after the animation, in milliseconds.
    #[arg(long, default_value_t = 300)]
    tail_pad_ms: u32,

    /// Delay of the soundtrack relative to the first frame, in milliseconds.
    #[arg(long, default_value_t = 0)]
    audio_lead_in_ms: u32,

    /// Print export statistics as JSON.
    #[arg(long)]
    stats: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Animation progress in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print the frame report as JSON.
    #[arg(long)]
    report: bool,
}

#[derive(Parser, Debug)]
struct SoundArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Output WAV path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Vp9,
    Vp8,
    Mp4,
    Vp8Silent,
}

impl From<FormatChoice> for ContainerFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Vp9 => ContainerFormat::WebmVp9Opus,
            FormatChoice::Vp8 => ContainerFormat::WebmVp8Opus,
            FormatChoice::Mp4 => ContainerFormat::Mp4H264Aac,
            FormatChoice::Vp8Silent => ContainerFormat::WebmVp8Silent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sound(args) => cmd_sound(args),
        Command::Presets => cmd_presets(),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_request(args: RequestArgs) -> anyhow::Result<AnimationRequest> {
    let mut req = match args.config.as_deref() {
        Some(path) => AnimationRequest::from_path(path)?,
        None => AnimationRequest::default(),
    };

    if let Some(text) = args.text {
        req.text = Some(text);
        req.content = ContentMode::Text;
    }
    if let Some(image) = args.image {
        req.image = Some(ImageRef::Path(image));
        req.content = ContentMode::Image;
    }
    if let Some(content) = args.content {
        req.content = content;
    }
    if let Some(style) = args.style {
        req.style = style;
    }
    if let Some(d) = args.duration {
        req.duration_secs = d;
    }
    if let Some(fps) = args.fps {
        req.fps = Fps::per_second(fps)?;
    }
    if let Some(color) = args.color {
        req.color = color;
    }
    req.shadow |= args.shadow;
    req.glow |= args.glow;
    if let Some(font) = args.font {
        req.font = font;
    }
    if args.fade_speed.is_some() {
        req.fade_speed = args.fade_speed;
    }
    if args.flicker_ms.is_some() {
        req.flicker_interval_ms = args.flicker_ms;
    }
    if let Some(id) = args.sound_preset {
        req.sound.kind = SoundKind::Preset(id);
    } else if args.whoosh {
        req.sound.kind = SoundKind::Whoosh;
    } else if let Some(clip) = args.sound_clip {
        req.sound.kind = SoundKind::Clip(clip);
    }
    if let Some(v) = args.volume {
        req.sound.volume = v;
    }
    if args.width.is_some() || args.height.is_some() {
        req.canvas = Canvas {
            width: args.width.unwrap_or(req.canvas.width),
            height: args.height.unwrap_or(req.canvas.height),
        };
    }
    if let Some(seed) = args.seed {
        req.seed = seed;
    }

    req.validate()?;
    Ok(req)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = build_request(args.request)?;
    let mut studio = Studio::new();
    if let Some(target) = args.transcode {
        studio.set_transcoder(Some(Box::new(FfmpegTranscoder::to_format(target.into()))));
    }
    if let Some(path) = &args.monitor_wav {
        studio.set_audio_monitor(Some(Box::new(WavMonitor::new(path.clone()))));
    }

    let opts = ExportOptions {
        pacing: if args.realtime {
            Pacing::WallClock
        } else {
            Pacing::FixedStep
        },
        tail_pad_ms: args.tail_pad_ms,
        audio_lead_in_ms: args.audio_lead_in_ms,
        base_name: args.base_name,
        out_dir: Some(args.out_dir),
        format: args.format.map(ContainerFormat::from),
        transcode: args.transcode.is_some(),
        cancel: None,
    };

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let outcome = studio.export(&req, &mut sink, &opts)?;

    for path in &outcome.saved {
        eprintln!("wrote {}", path.display());
    }
    if let Some(path) = args.monitor_wav.as_ref().filter(|p| p.is_file()) {
        eprintln!("wrote {}", path.display());
    }
    if outcome.partial {
        eprintln!("warning: recording stopped early, the file is incomplete");
    }
    if let Some(reason) = &outcome.degraded {
        eprintln!("warning: transcoded copy unavailable: {reason}");
    }
    if args.stats {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.stats).context("serialize stats")?
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let req = build_request(args.request)?;
    let mut studio = Studio::new();
    let (frame, report) = studio.preview_frame(&req, args.progress)?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    if args.report {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize frame report")?
        );
    }
    Ok(())
}

fn cmd_sound(args: SoundArgs) -> anyhow::Result<()> {
    let req = build_request(args.request)?;
    let mut studio = Studio::new();
    let Some(pcm) = studio.render_sound(&req)? else {
        anyhow::bail!("the request has no sound (use --sound-preset, --whoosh or --sound-clip)");
    };
    write_wav(&pcm, &args.out)?;
    eprintln!("wrote {} ({:.2}s)", args.out.display(), pcm.duration_secs());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for p in presets() {
        println!("{:<11} {}", p.id, p.name);
    }
    Ok(())
}
