use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::fonts::ResolvedFont;
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Single-line text shaping with Parley.
///
/// Faces are registered once per font blob and face index, then reused for every frame.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<(usize, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct an engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &ResolvedFont) -> KinetypeResult<String> {
        let key = (Arc::as_ptr(&font.data) as usize, font.index);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.data.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            KinetypeError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| KinetypeError::validation("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, family_name.clone());
        Ok(family_name)
    }

    /// Shape `text` on one line at `size_px`.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> KinetypeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(KinetypeError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` at `size_px`.
    pub fn measure(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
    ) -> KinetypeResult<f32> {
        let layout = self.layout_line(text, font, size_px, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}

/// Font size that keeps text within `max_width_px`.
///
/// Text measured at `base_px` wider than the limit shrinks proportionally, never below
/// `floor_px`.
pub fn fit_font_size(measured_width: f32, base_px: f32, max_width_px: f32, floor_px: f32) -> f32 {
    if !measured_width.is_finite() || measured_width <= max_width_px || measured_width <= 0.0 {
        return base_px;
    }
    (base_px * (max_width_px / measured_width)).floor().max(floor_px)
}

/// Prefix of `text` holding `chars` characters (char-boundary safe).
pub fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
