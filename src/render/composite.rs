use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u16, unit_to_u8_weight};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied pixels, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = unit_to_u8_weight(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over of two equal-size premultiplied buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> KinetypeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(KinetypeError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    if unit_to_u8_weight(opacity) == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// 8-bit coverage plane placed at an offset on a larger surface.
#[derive(Clone, Debug)]
pub struct AlphaPlane {
    /// Left edge on the destination, may be negative.
    pub x: i64,
    /// Top edge on the destination, may be negative.
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// One coverage byte per pixel, row-major.
    pub data: Vec<u8>,
}

/// Composite `plane` tinted with premultiplied `color` over `dst`, clipped to the surface.
pub fn tinted_plane_over(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    plane: &AlphaPlane,
    color: PremulRgba8,
    opacity: f32,
) -> KinetypeResult<()> {
    if dst.len() != dst_width as usize * dst_height as usize * 4 {
        return Err(KinetypeError::validation(
            "tinted_plane_over expects dst matching width*height*4",
        ));
    }
    if plane.data.len() != plane.width as usize * plane.height as usize {
        return Err(KinetypeError::validation(
            "alpha plane data does not match its size",
        ));
    }

    let dw = i64::from(dst_width);
    let dh = i64::from(dst_height);
    for py in 0..i64::from(plane.height) {
        let y = plane.y + py;
        if !(0..dh).contains(&y) {
            continue;
        }
        for px in 0..i64::from(plane.width) {
            let x = plane.x + px;
            if !(0..dw).contains(&x) {
                continue;
            }
            let cov = u16::from(plane.data[(py * i64::from(plane.width) + px) as usize]);
            if cov == 0 {
                continue;
            }
            let src = [
                mul_div255_u16(u16::from(color[0]), cov) as u8,
                mul_div255_u16(u16::from(color[1]), cov) as u8,
                mul_div255_u16(u16::from(color[2]), cov) as u8,
                mul_div255_u16(u16::from(color[3]), cov) as u8,
            ];
            let i = ((y * dw + x) as usize) * 4;
            let out = over([dst[i], dst[i + 1], dst[i + 2], dst[i + 3]], src, opacity);
            dst[i..i + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Fill a premultiplied buffer with one pixel value.
pub fn fill(dst: &mut [u8], px: PremulRgba8) {
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
