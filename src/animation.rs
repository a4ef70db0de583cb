pub mod ease;
pub mod flicker;
pub mod style;
pub mod timeline;
