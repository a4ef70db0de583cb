use std::path::PathBuf;

use crate::assets::PreparedImage;
use crate::assets::decode::{decode_image, load_image};
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Text shown when text mode has nothing to say.
pub const PLACEHOLDER_TEXT: &str = "Sample Text";

/// Text shown in place of an image that could not be used.
pub const NO_IMAGE_TEXT: &str = "No image selected";

/// What kind of content a request animates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// A text line.
    #[default]
    Text,
    /// A still image.
    Image,
}

impl std::str::FromStr for ContentMode {
    type Err = KinetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(KinetypeError::validation(format!(
                "unknown content mode '{other}' (expected text or image)"
            ))),
        }
    }
}

/// Where image bytes come from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// File on disk (raster or SVG).
    Path(PathBuf),
    /// In-memory encoded bytes.
    Bytes(Vec<u8>),
}

impl ImageRef {
    fn load(&self) -> KinetypeResult<PreparedImage> {
        match self {
            Self::Path(p) => load_image(p),
            Self::Bytes(b) => decode_image(b),
        }
    }
}

/// Renderable content, normalized from a request.
#[derive(Clone, Debug)]
pub enum Content {
    /// Text drawn with the request's font and color.
    Text(String),
    /// Decoded image drawn at its display size.
    Image(PreparedImage),
    /// Fixed fallback text used when the requested content is unavailable.
    Placeholder(&'static str),
}

impl Content {
    /// Text to draw, for text and placeholder content.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Placeholder(s) => Some(s),
            Self::Image(_) => None,
        }
    }

    /// Number of characters the typewriter style reveals.
    pub fn char_len(&self) -> usize {
        self.text().map_or(0, |s| s.chars().count())
    }

    /// True when fallback text stands in for the requested content.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Content selection of a request: the mode plus whichever inputs the user supplied.
#[derive(Clone, Copy, Debug)]
pub struct ContentSource<'a> {
    /// Selected mode.
    pub mode: ContentMode,
    /// Text input (may be empty).
    pub text: Option<&'a str>,
    /// Image input.
    pub image: Option<&'a ImageRef>,
}

impl ContentSource<'_> {
    /// Fail when the selected mode has no required input.
    ///
    /// Text mode always passes (empty text becomes a placeholder); image mode needs an image.
    pub fn ensure_present(&self) -> KinetypeResult<()> {
        match self.mode {
            ContentMode::Text => Ok(()),
            ContentMode::Image if self.image.is_some() => Ok(()),
            ContentMode::Image => Err(KinetypeError::missing_content(
                "image mode selected but no image was provided",
            )),
        }
    }

    /// Resolve for export: missing inputs are refused, undecodable images degrade.
    pub fn resolve(&self) -> KinetypeResult<Content> {
        self.ensure_present()?;
        Ok(self.resolve_lenient())
    }

    /// Resolve for preview: every problem degrades to placeholder text.
    pub fn resolve_lenient(&self) -> Content {
        match self.mode {
            ContentMode::Text => match self.text.map(str::trim) {
                Some(t) if !t.is_empty() => Content::Text(t.to_owned()),
                _ => Content::Placeholder(PLACEHOLDER_TEXT),
            },
            ContentMode::Image => {
                let Some(image) = self.image else {
                    return Content::Placeholder(NO_IMAGE_TEXT);
                };
                match image.load() {
                    Ok(img) => Content::Image(img),
                    Err(e) => {
                        tracing::warn!(error = %e, "image could not be decoded, drawing placeholder");
                        Content::Placeholder(NO_IMAGE_TEXT)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/content/content.rs"]
mod tests;
