//! Content assets: colors, images, font resolution and text shaping.

use std::sync::Arc;

pub mod color;
pub mod decode;
pub mod fonts;
pub mod text;

/// Decoded image ready for compositing.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}
