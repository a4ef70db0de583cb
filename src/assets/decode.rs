use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::PreparedImage;
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Longest side a decoded image keeps before display scaling.
pub const MAX_RASTER_DIM: u32 = 2048;

/// Decode raster or SVG bytes into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> KinetypeResult<PreparedImage> {
    if looks_like_svg(bytes) {
        return rasterize_svg(bytes);
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let mut rgba = dyn_img.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(KinetypeError::validation("image has zero width or height"));
    }
    premultiply_rgba8_in_place(&mut rgba);

    let (width, height) = raster_size(src_w, src_h);
    if (width, height) != (src_w, src_h) {
        tracing::debug!(src_w, src_h, width, height, "downscaling large image");
        rgba = image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Triangle);
    }
    let rgba8_premul = rgba.into_raw();

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> KinetypeResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Size of a `width`x`height` image once its longest side is capped at [`MAX_RASTER_DIM`].
pub(crate) fn raster_size(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_RASTER_DIM {
        return (width, height);
    }
    let fit = f64::from(MAX_RASTER_DIM) / f64::from(longest);
    let scaled = |v: u32| ((f64::from(v) * fit).round() as u32).clamp(1, MAX_RASTER_DIM);
    (scaled(width), scaled(height))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn rasterize_svg(bytes: &[u8]) -> KinetypeResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(KinetypeError::validation("svg has invalid width/height"));
    }
    let fit = (MAX_RASTER_DIM as f32 / w.max(h)).min(1.0);
    let width = ((w * fit).ceil() as u32).max(1);
    let height = ((h * fit).ceil() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| KinetypeError::validation("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(width as f32 / w, height as f32 / h);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
