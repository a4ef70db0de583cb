use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::ease::ease_out_cubic;
use crate::animation::style::resolve_style;
use crate::assets::PreparedImage;
use crate::assets::fonts::{FontBook, ResolvedFont};
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, char_prefix, fit_font_size};
use crate::content::{Content, NO_IMAGE_TEXT};
use crate::foundation::core::{Affine, Canvas, Rgba8, Vec2};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::render::blur::{blur_alpha8, radius_for_sigma};
use crate::render::composite::{AlphaPlane, fill, over_in_place, tinted_plane_over};
use crate::render::frame::FrameRGBA;
use crate::request::ResolvedRequest;

/// Font size text starts from before fitting.
pub const BASE_FONT_PX: f32 = 150.0;
/// Smallest size fitting may shrink text to.
pub const MIN_FONT_PX: f32 = 40.0;
/// Widest text may be, as a fraction of surface width.
pub const MAX_TEXT_WIDTH_FRACTION: f32 = 0.8;
/// Longest side an image is displayed at.
pub const MAX_IMAGE_DIM: f64 = 520.0;

const NO_IMAGE_FONT_PX: f32 = 48.0;
const NO_IMAGE_FONT_FAMILY: &str = "VT323";

/// Blurred, offset copy of the content's coverage drawn beneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSpec {
    /// Shadow color (straight alpha).
    pub color: Rgba8,
    /// Blur amount; the gaussian sigma is half of it.
    pub blur: f32,
    /// Offset in surface pixels.
    pub offset: Vec2,
}

impl ShadowSpec {
    /// Plain drop shadow.
    pub const DROP: ShadowSpec = ShadowSpec {
        color: Rgba8::new(0, 0, 0, 153),
        blur: 18.0,
        offset: Vec2::new(10.0, 10.0),
    };

    /// Glow blur amount.
    pub const GLOW_BLUR: f32 = 60.0;

    /// Effective shadow of text drawn in `text_color`.
    ///
    /// Glow replaces the shadow's color and blur. The drop offset survives only when the drop
    /// shadow is also requested.
    pub fn for_text(shadow: bool, glow: bool, text_color: Rgba8) -> Option<ShadowSpec> {
        match (shadow, glow) {
            (false, false) => None,
            (true, false) => Some(Self::DROP),
            (drop, true) => Some(ShadowSpec {
                color: text_color,
                blur: Self::GLOW_BLUR,
                offset: if drop { Self::DROP.offset } else { Vec2::ZERO },
            }),
        }
    }

    /// Gaussian sigma.
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }
}

/// Display size of a `width`x`height` image, aspect kept, longest side at most `max_dim`.
pub fn display_size(width: u32, height: u32, max_dim: f64) -> (f64, f64) {
    let (mut w, mut h) = (f64::from(width), f64::from(height));
    if h <= 0.0 || w <= 0.0 {
        return (0.0, 0.0);
    }
    let aspect = w / h;
    if w > h {
        if w > max_dim {
            w = max_dim;
            h = w / aspect;
        }
    } else if h > max_dim {
        h = max_dim;
        w = h * aspect;
    }
    (w, h)
}

/// What the compositor drew for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Clamped input progress.
    pub progress: f64,
    /// Eased progress.
    pub eased: f64,
    /// Content opacity.
    pub opacity: f64,
    /// Content scale.
    pub scale: f64,
    /// Content rotation, radians.
    pub rotation: f64,
    /// Offset from the surface center.
    pub offset: Vec2,
    /// Font size used for text.
    pub font_px: Option<f32>,
    /// Visible characters for the typewriter style.
    pub visible_chars: Option<usize>,
    /// Family the text was drawn with.
    pub font_family: Option<String>,
    /// False when no font was available or nothing was visible.
    pub glyphs_drawn: bool,
    /// Displayed image size.
    pub image_size: Option<(f64, f64)>,
}

/// Draws frames onto a fixed-size chroma-key surface.
///
/// Owns the raster context, the scratch content layer and the output buffer, so one compositor
/// must never be shared by two exports at once.
pub struct FrameCompositor {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    layer: vello_cpu::Pixmap,
    frame: FrameRGBA,
    fonts: FontBook,
    text: TextLayoutEngine,
    font_data: HashMap<(usize, u32), vello_cpu::peniko::FontData>,
    image_paint: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("canvas", &self.canvas)
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl FrameCompositor {
    /// Compositor for `canvas`, resolving fonts from `fonts`.
    pub fn new(canvas: Canvas, fonts: FontBook) -> KinetypeResult<Self> {
        canvas.validate()?;
        let w = u16::try_from(canvas.width)
            .map_err(|_| KinetypeError::validation("canvas width exceeds u16"))?;
        let h = u16::try_from(canvas.height)
            .map_err(|_| KinetypeError::validation("canvas height exceeds u16"))?;
        let mut frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba_len()],
            premultiplied: true,
        };
        fill(&mut frame.data, Rgba8::CHROMA_GREEN.to_premul());
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            layer: vello_cpu::Pixmap::new(w, h),
            frame,
            fonts,
            text: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            image_paint: None,
        })
    }

    /// Surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Give the font book back, e.g. to build a compositor of another size.
    pub fn into_fonts(self) -> FontBook {
        self.fonts
    }

    /// Current frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Current frame bytes (premultiplied RGBA8).
    pub fn frame_bytes(&self) -> &[u8] {
        &self.frame.data
    }

    /// Copy of the current frame.
    pub fn snapshot(&self) -> FrameRGBA {
        self.frame.clone()
    }

    /// Draw the frame at `progress`, overwriting the whole surface.
    ///
    /// `flicker_font` replaces the request font for the font-flicker style.
    pub fn compose(
        &mut self,
        progress: f64,
        req: &ResolvedRequest,
        flicker_font: Option<&str>,
    ) -> KinetypeResult<FrameReport> {
        if req.canvas() != self.canvas {
            return Err(KinetypeError::validation(format!(
                "request canvas {}x{} does not match compositor {}x{}",
                req.canvas().width,
                req.canvas().height,
                self.canvas.width,
                self.canvas.height
            )));
        }

        let p = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let st = resolve_style(req.style, p, &req.style_params);
        let mut report = FrameReport {
            progress: p,
            eased: ease_out_cubic(p),
            opacity: st.opacity,
            scale: st.scale,
            rotation: st.rotation,
            offset: st.offset,
            font_px: None,
            visible_chars: None,
            font_family: None,
            glyphs_drawn: false,
            image_size: None,
        };

        fill(&mut self.frame.data, Rgba8::CHROMA_GREEN.to_premul());
        self.ctx.reset();
        let placement = st.affine(self.canvas);

        let mut shadow = None;
        let drawn = match &req.content {
            Content::Image(img) => {
                report.image_size = Some(self.draw_image(img, placement)?);
                true
            }
            Content::Placeholder(text) if *text == NO_IMAGE_TEXT => {
                let run = TextRun {
                    text: *text,
                    family: NO_IMAGE_FONT_FAMILY,
                    color: Rgba8::WHITE,
                    size: TextSize::Fixed(NO_IMAGE_FONT_PX),
                    visible_chars: None,
                };
                self.draw_text(&run, placement, &mut report)?
            }
            Content::Text(_) | Content::Placeholder(_) => {
                let text = req.content.text().unwrap_or_default();
                shadow = ShadowSpec::for_text(req.shadow, req.glow, req.color);
                report.visible_chars = st.visible_chars;
                let run = TextRun {
                    text,
                    family: flicker_font.unwrap_or(&req.font),
                    color: req.color,
                    size: TextSize::Fit,
                    visible_chars: st.visible_chars,
                };
                self.draw_text(&run, placement, &mut report)?
            }
        };

        if drawn {
            self.ctx.flush();
            self.layer.data_as_u8_slice_mut().fill(0);
            self.ctx.render_to_pixmap(&mut self.layer);

            let opacity = st.opacity as f32;
            if let Some(spec) = shadow {
                self.draw_shadow(&spec, opacity)?;
            }
            over_in_place(&mut self.frame.data, self.layer.data_as_u8_slice(), opacity)?;
        }
        Ok(report)
    }

    fn draw_image(&mut self, img: &PreparedImage, placement: Affine) -> KinetypeResult<(f64, f64)> {
        let paint = self.image_paint_for(img)?;
        let (w, h) = display_size(img.width, img.height, MAX_IMAGE_DIM);
        let tr = placement
            * Affine::translate((-w / 2.0, -h / 2.0))
            * Affine::scale_non_uniform(w / f64::from(img.width), h / f64::from(img.height));

        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        Ok((w, h))
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> KinetypeResult<vello_cpu::Image> {
        // Holding the source keeps its allocation from being reused by a later image.
        if let Some((src, paint)) = &self.image_paint
            && Arc::ptr_eq(src, &img.rgba8_premul)
        {
            return Ok(paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paint = Some((Arc::clone(&img.rgba8_premul), paint.clone()));
        Ok(paint)
    }

    fn draw_text(
        &mut self,
        run: &TextRun<'_>,
        placement: Affine,
        report: &mut FrameReport,
    ) -> KinetypeResult<bool> {
        let Some(font) = self.fonts.resolve(run.family) else {
            return Ok(false);
        };
        report.font_family = Some(font.family.clone());

        let size = match run.size {
            TextSize::Fixed(px) => px,
            TextSize::Fit => {
                let measured = self.text.measure(run.text, &font, BASE_FONT_PX)?;
                let max_w = self.canvas.width as f32 * MAX_TEXT_WIDTH_FRACTION;
                fit_font_size(measured, BASE_FONT_PX, max_w, MIN_FONT_PX)
            }
        };
        report.font_px = Some(size);

        let shown = match run.visible_chars {
            Some(n) => char_prefix(run.text, n),
            None => run.text,
        };
        if shown.is_empty() {
            return Ok(false);
        }

        let brush = TextBrushRgba8 {
            r: run.color.r,
            g: run.color.g,
            b: run.color.b,
            a: run.color.a,
        };
        let layout = self.text.layout_line(shown, &font, size, brush)?;
        let tr = placement
            * Affine::translate((
                -f64::from(layout.width()) / 2.0,
                -f64::from(layout.height()) / 2.0,
            ));
        let font_data = self.font_data_for(&font);

        self.ctx.set_transform(affine_to_cpu(tr));
        let mut any = false;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let brush = glyph_run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = glyph_run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                self.ctx
                    .glyph_run(&font_data)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
                any = true;
            }
        }
        report.glyphs_drawn = any;
        Ok(any)
    }

    fn font_data_for(&mut self, font: &ResolvedFont) -> vello_cpu::peniko::FontData {
        let key = (Arc::as_ptr(&font.data) as usize, font.index);
        self.font_data
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
                    font.index,
                )
            })
            .clone()
    }

    fn draw_shadow(&mut self, spec: &ShadowSpec, opacity: f32) -> KinetypeResult<()> {
        let Some(mut plane) = coverage_plane(
            self.layer.data_as_u8_slice(),
            self.canvas,
            radius_for_sigma(spec.sigma()),
        ) else {
            return Ok(());
        };
        let radius = radius_for_sigma(spec.sigma());
        plane.data = blur_alpha8(&plane.data, plane.width, plane.height, radius, spec.sigma())?;
        plane.x += spec.offset.x.round() as i64;
        plane.y += spec.offset.y.round() as i64;
        tinted_plane_over(
            &mut self.frame.data,
            self.canvas.width,
            self.canvas.height,
            &plane,
            spec.color.to_premul(),
            opacity,
        )
    }
}

#[derive(Clone, Copy, Debug)]
enum TextSize {
    Fit,
    Fixed(f32),
}

struct TextRun<'a> {
    text: &'a str,
    family: &'a str,
    color: Rgba8,
    size: TextSize,
    visible_chars: Option<usize>,
}

/// Alpha of the drawn content's bounding box, padded by `pad` on every side.
fn coverage_plane(layer: &[u8], canvas: Canvas, pad: u32) -> Option<AlphaPlane> {
    let w = canvas.width as usize;
    let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
    for (i, px) in layer.chunks_exact(4).enumerate() {
        if px[3] != 0 {
            let (x, y) = (i % w, i / w);
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    if x0 == usize::MAX {
        return None;
    }

    let pad = pad as usize;
    let pw = x1 - x0 + 1 + 2 * pad;
    let ph = y1 - y0 + 1 + 2 * pad;
    let mut data = vec![0u8; pw * ph];
    for y in y0..=y1 {
        for x in x0..=x1 {
            data[(y - y0 + pad) * pw + (x - x0 + pad)] = layer[(y * w + x) * 4 + 3];
        }
    }
    Some(AlphaPlane {
        x: x0 as i64 - pad as i64,
        y: y0 as i64 - pad as i64,
        width: pw as u32,
        height: ph as u32,
        data,
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> KinetypeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| KinetypeError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| KinetypeError::validation("image height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(KinetypeError::validation("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
