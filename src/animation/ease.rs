/// Cubic ease-out: `1 - (1 - p)^3`, with `p` clamped to `[0, 1]`.
///
/// Every positional style is driven by this curve.
pub fn ease_out_cubic(p: f64) -> f64 {
    Ease::OutCubic.apply(p)
}

/// Easing curves used to map normalized animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation (used by the fade-speed axis).
    Linear,
    /// Cubic ease-out.
    #[default]
    OutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
