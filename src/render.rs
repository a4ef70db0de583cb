//! CPU frame rendering: compositor, blur and pixel compositing helpers.

pub mod blur;
pub mod composite;
pub mod compositor;
pub mod frame;

pub use compositor::{FrameCompositor, FrameReport, ShadowSpec};
pub use frame::FrameRGBA;
