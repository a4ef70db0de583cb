use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::KinetypeError;

/// Scale the zoom style starts from.
pub const DEFAULT_ZOOM_MIN_SCALE: f64 = 0.2;

const BOUNCE_AMPLITUDE_PX: f64 = 80.0;
const WAVE_AMPLITUDE_PX: f64 = 50.0;
const WAVE_FREQUENCY: f64 = 6.0;

/// Identifier of the transform applied to content for a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleTag {
    /// Static, centered.
    #[default]
    None,
    /// Enter from the left edge.
    Left,
    /// Enter from the right edge.
    Right,
    /// Enter from the top edge.
    Top,
    /// Enter from the bottom edge.
    Bottom,
    /// Opacity ramp.
    Fade,
    /// Scale up about the surface center.
    Zoom,
    /// One full turn.
    Rotate,
    /// Damped vertical bounce.
    Bounce,
    /// Periodic vertical wave.
    Wave,
    /// Character-by-character reveal.
    Typewriter,
    /// Font identity swapped on every flicker tick.
    FontFlicker,
}

impl StyleTag {
    /// Every style, in menu order.
    pub const ALL: [StyleTag; 12] = [
        StyleTag::None,
        StyleTag::Left,
        StyleTag::Right,
        StyleTag::Top,
        StyleTag::Bottom,
        StyleTag::Fade,
        StyleTag::Zoom,
        StyleTag::Rotate,
        StyleTag::Bounce,
        StyleTag::Wave,
        StyleTag::Typewriter,
        StyleTag::FontFlicker,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Fade => "fade",
            Self::Zoom => "zoom",
            Self::Rotate => "rotate",
            Self::Bounce => "bounce",
            Self::Wave => "wave",
            Self::Typewriter => "typewriter",
            Self::FontFlicker => "font-flicker",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = KinetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('_', "-");
        StyleTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s || (s == "flicker" && *t == StyleTag::FontFlicker))
            .ok_or_else(|| KinetypeError::validation(format!("unknown animation style '{s}'")))
    }
}

/// Multiplier on how fast opacity reaches 1, decoupled from positional easing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeSpeed {
    /// Half speed.
    Slow,
    /// Reaches full opacity at the end of the animation.
    #[default]
    Normal,
    /// Reaches full opacity halfway through.
    Fast,
}

impl FadeSpeed {
    /// Progress multiplier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Slow => 0.5,
            Self::Normal => 1.0,
            Self::Fast => 2.0,
        }
    }

    /// Secondary progress axis: `min(p * multiplier, 1)`.
    pub fn fade_progress(self, p: f64) -> f64 {
        (p.clamp(0.0, 1.0) * self.multiplier()).min(1.0)
    }
}

impl FromStr for FadeSpeed {
    type Err = KinetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            other => Err(KinetypeError::validation(format!(
                "unknown fade speed '{other}' (expected slow, normal or fast)"
            ))),
        }
    }
}

/// Inputs of the style table that do not change within one export.
#[derive(Clone, Copy, Debug)]
pub struct StyleParams {
    /// Surface dimensions.
    pub canvas: Canvas,
    /// Characters in the displayed text (0 for images).
    pub text_len: usize,
    /// Optional secondary fade axis.
    pub fade_speed: Option<FadeSpeed>,
    /// Starting scale of the zoom style.
    pub zoom_min_scale: f64,
}

impl StyleParams {
    /// Parameters with default zoom and no fade-speed override.
    pub fn new(canvas: Canvas, text_len: usize) -> Self {
        Self {
            canvas,
            text_len,
            fade_speed: None,
            zoom_min_scale: DEFAULT_ZOOM_MIN_SCALE,
        }
    }
}

/// Geometric/opacity transform resolved for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleTransform {
    /// Offset from the surface center, in pixels.
    pub offset: Vec2,
    /// Content opacity in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale about the content center.
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Visible text prefix, in characters (typewriter only).
    pub visible_chars: Option<usize>,
}

impl StyleTransform {
    /// Identity placement: centered, opaque, unscaled.
    pub const IDENTITY: StyleTransform = StyleTransform {
        offset: Vec2::ZERO,
        opacity: 1.0,
        scale: 1.0,
        rotation: 0.0,
        visible_chars: None,
    };

    /// Content-to-surface transform: center, offset, rotate, scale (content drawn about origin).
    ///
    /// Built from scratch for every frame so nothing carries over between frames.
    pub fn affine(&self, canvas: Canvas) -> Affine {
        let c = canvas.center().to_vec2() + self.offset;
        Affine::translate(c) * Affine::rotate(self.rotation) * Affine::scale(self.scale)
    }
}

/// Resolve the transform of `style` at progress `p`.
pub fn resolve_style(style: StyleTag, p: f64, params: &StyleParams) -> StyleTransform {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    let e = Ease::OutCubic.apply(p);
    let half_w = f64::from(params.canvas.width) / 2.0;
    let half_h = f64::from(params.canvas.height) / 2.0;

    let mut out = StyleTransform::IDENTITY;
    match style {
        StyleTag::None | StyleTag::FontFlicker => {}
        StyleTag::Left => out.offset.x = -half_w + e * half_w,
        StyleTag::Right => out.offset.x = half_w - e * half_w,
        StyleTag::Top => out.offset.y = -half_h + e * half_h,
        StyleTag::Bottom => out.offset.y = half_h - e * half_h,
        StyleTag::Fade => {
            let fp = params.fade_speed.unwrap_or_default().fade_progress(p);
            out.opacity = Ease::OutCubic.apply(fp);
        }
        StyleTag::Zoom => {
            let min = params.zoom_min_scale.clamp(0.0, 1.0);
            out.scale = min + (1.0 - min) * e;
        }
        StyleTag::Rotate => out.rotation = e * TAU,
        StyleTag::Bounce => out.offset.y = (e * TAU).sin() * BOUNCE_AMPLITUDE_PX * (1.0 - e),
        StyleTag::Wave => out.offset.y = (e * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE_PX,
        StyleTag::Typewriter => {
            let n = (e * params.text_len as f64).floor() as usize;
            out.visible_chars = Some(n.min(params.text_len));
        }
    }

    if style != StyleTag::Fade
        && let Some(speed) = params.fade_speed
    {
        out.opacity = Ease::Linear.apply(speed.fade_progress(p));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/style.rs"]
mod tests;
