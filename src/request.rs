use std::path::Path;

use anyhow::Context;

use crate::animation::flicker::DEFAULT_FLICKER_INTERVAL_MS;
use crate::animation::style::{DEFAULT_ZOOM_MIN_SCALE, FadeSpeed, StyleParams, StyleTag};
use crate::assets::color::parse_color;
use crate::audio::engine::SoundSpec;
use crate::content::{Content, ContentMode, ContentSource, ImageRef};
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Font families cycled by the font-flicker style when the request names none.
pub const DEFAULT_FLICKER_FONTS: [&str; 7] = [
    "Arial",
    "Georgia",
    "Courier New",
    "Impact",
    "Times New Roman",
    "Verdana",
    "Comic Sans MS",
];

/// Everything one export needs, as supplied by the user.
///
/// Deserializes from JSON with every field optional; `validate` checks the combination.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationRequest {
    /// Text or image.
    pub content: ContentMode,
    /// Text to animate (text mode).
    pub text: Option<String>,
    /// Image to animate (image mode).
    pub image: Option<ImageRef>,
    /// Animation style.
    pub style: StyleTag,
    /// Animation length in seconds.
    pub duration_secs: f64,
    /// Frame rate.
    pub fps: Fps,
    /// Text color (`#rrggbb`, `rgb(..)`, or a CSS color name).
    pub color: String,
    /// Drop shadow under text.
    pub shadow: bool,
    /// Colored glow around text.
    pub glow: bool,
    /// Font family name.
    pub font: String,
    /// Time between font swaps for the font-flicker style.
    pub flicker_interval_ms: Option<u32>,
    /// Families cycled by the font-flicker style.
    pub flicker_fonts: Vec<String>,
    /// Secondary fade axis.
    pub fade_speed: Option<FadeSpeed>,
    /// Soundtrack.
    pub sound: SoundSpec,
    /// Output surface size.
    pub canvas: Canvas,
    /// Starting scale of the zoom style.
    pub zoom_min_scale: f64,
    /// Seed for the flicker pool and synth LFO.
    pub seed: u64,
}

impl Default for AnimationRequest {
    fn default() -> Self {
        Self {
            content: ContentMode::Text,
            text: None,
            image: None,
            style: StyleTag::None,
            duration_secs: 3.0,
            fps: Fps::default(),
            color: "#ffffff".to_owned(),
            shadow: false,
            glow: false,
            font: "Arial".to_owned(),
            flicker_interval_ms: None,
            flicker_fonts: Vec::new(),
            fade_speed: None,
            sound: SoundSpec::default(),
            canvas: Canvas::default(),
            zoom_min_scale: DEFAULT_ZOOM_MIN_SCALE,
            seed: 0,
        }
    }
}

impl AnimationRequest {
    /// Parse a JSON request.
    pub fn from_json_str(s: &str) -> KinetypeResult<Self> {
        serde_json::from_str(s).map_err(|e| KinetypeError::serde(e.to_string()))
    }

    /// Read and parse a JSON request file.
    pub fn from_path(path: &Path) -> KinetypeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read request '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Content selection of this request.
    pub fn content_source(&self) -> ContentSource<'_> {
        ContentSource {
            mode: self.content,
            text: self.text.as_deref(),
            image: self.image.as_ref(),
        }
    }

    /// Check field ranges and combinations. Does not touch content files.
    pub fn validate(&self) -> KinetypeResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(KinetypeError::validation("duration_secs must be finite and > 0"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        self.canvas.validate()?;
        parse_color(&self.color)?;
        if self.font.trim().is_empty() {
            return Err(KinetypeError::validation("font must not be empty"));
        }
        if self.flicker_interval_ms == Some(0) {
            return Err(KinetypeError::validation("flicker_interval_ms must be > 0"));
        }
        if !self.zoom_min_scale.is_finite()
            || self.zoom_min_scale <= 0.0
            || self.zoom_min_scale > 1.0
        {
            return Err(KinetypeError::validation("zoom_min_scale must be in (0, 1]"));
        }
        self.sound.validate()
    }

    /// Flicker interval, defaulted.
    pub fn flicker_interval(&self) -> u32 {
        self.flicker_interval_ms.unwrap_or(DEFAULT_FLICKER_INTERVAL_MS)
    }

    /// Flicker font pool: the request's list, or the request font plus the built-in list.
    pub fn flicker_pool(&self) -> Vec<String> {
        if !self.flicker_fonts.is_empty() {
            return self.flicker_fonts.clone();
        }
        std::iter::once(self.font.clone())
            .chain(DEFAULT_FLICKER_FONTS.iter().map(|s| (*s).to_owned()))
            .collect()
    }

    /// Validate and resolve for export; image mode without an image is refused.
    pub fn resolve(&self) -> KinetypeResult<ResolvedRequest> {
        self.validate()?;
        let content = self.content_source().resolve()?;
        self.finish(content)
    }

    /// Validate and resolve for a still preview; missing content becomes a placeholder.
    pub fn resolve_preview(&self) -> KinetypeResult<ResolvedRequest> {
        self.validate()?;
        let content = self.content_source().resolve_lenient();
        self.finish(content)
    }

    fn finish(&self, content: Content) -> KinetypeResult<ResolvedRequest> {
        let mut style_params = StyleParams::new(self.canvas, content.char_len());
        style_params.fade_speed = self.fade_speed;
        style_params.zoom_min_scale = self.zoom_min_scale;
        Ok(ResolvedRequest {
            style: self.style,
            style_params,
            color: parse_color(&self.color)?,
            shadow: self.shadow,
            glow: self.glow,
            font: self.font.trim().to_owned(),
            content,
        })
    }
}

/// Request with parsed values and decoded content, ready for the compositor.
#[derive(Clone, Debug)]
pub struct ResolvedRequest {
    /// Content to draw.
    pub content: Content,
    /// Animation style.
    pub style: StyleTag,
    /// Style inputs fixed for the export.
    pub style_params: StyleParams,
    /// Text color.
    pub color: Rgba8,
    /// Drop shadow under text.
    pub shadow: bool,
    /// Colored glow around text.
    pub glow: bool,
    /// Font family name.
    pub font: String,
}

impl ResolvedRequest {
    /// Output surface size.
    pub fn canvas(&self) -> Canvas {
        self.style_params.canvas
    }
}

#[cfg(test)]
#[path = "../tests/unit/content/request.rs"]
mod tests;
