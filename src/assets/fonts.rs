use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Environment variable naming an extra directory of font files.
pub const FONT_DIR_ENV: &str = "KINETYPE_FONT_DIR";

/// Raw font face resolved from a family name.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Family name the face belongs to.
    pub family: String,
    /// Font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index inside `data` (font collections).
    pub index: u32,
    /// True when the requested family was not found and a default face was used.
    pub fallback: bool,
}

/// Family-name to font-face resolution backed by `fontdb`.
///
/// Lookups never fail: unknown families fall back to the default sans-serif face, then to any
/// loaded face. Only an empty database yields `None`.
pub struct FontBook {
    db: fontdb::Database,
    resolved: HashMap<String, Option<ResolvedFont>>,
    face_data: HashMap<fontdb::ID, (Arc<Vec<u8>>, u32)>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl FontBook {
    /// Book with no faces loaded.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
            resolved: HashMap::new(),
            face_data: HashMap::new(),
        }
    }

    /// Book with system fonts plus the directory named by [`FONT_DIR_ENV`], if set.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        if let Some(dir) = std::env::var_os(FONT_DIR_ENV) {
            book.load_font_dir(Path::new(&dir));
        }
        tracing::debug!(faces = book.face_count(), "font book loaded");
        book
    }

    /// Load every font file below `dir`.
    pub fn load_font_dir(&mut self, dir: &Path) {
        self.db.load_fonts_dir(dir);
        self.resolved.clear();
    }

    /// Load one font file.
    pub fn load_font_file(&mut self, path: &Path) -> KinetypeResult<()> {
        self.db.load_font_file(path).map_err(|e| {
            KinetypeError::validation(format!("failed to load font '{}': {e}", path.display()))
        })?;
        self.resolved.clear();
        Ok(())
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve `family` to a bold face, falling back as described on [`FontBook`].
    pub fn resolve(&mut self, family: &str) -> Option<ResolvedFont> {
        let key = family.trim().to_owned();
        if let Some(hit) = self.resolved.get(&key) {
            return hit.clone();
        }

        let out = self.lookup(&key);
        match &out {
            Some(f) if f.fallback => {
                tracing::warn!(requested = %key, using = %f.family, "font family not found, using default");
            }
            None => tracing::warn!(requested = %key, "no fonts available, text will not be drawn"),
            _ => {}
        }
        self.resolved.insert(key, out.clone());
        out
    }

    fn lookup(&mut self, family: &str) -> Option<ResolvedFont> {
        let named = (!family.is_empty())
            .then(|| self.query(fontdb::Family::Name(family)))
            .flatten();
        if let Some(id) = named {
            return self.face(id, false);
        }

        let id = self
            .query(fontdb::Family::SansSerif)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        self.face(id, true)
    }

    fn query(&self, family: fontdb::Family<'_>) -> Option<fontdb::ID> {
        let families = [family];
        let bold = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::BOLD,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        self.db.query(&bold)
    }

    fn face(&mut self, id: fontdb::ID, fallback: bool) -> Option<ResolvedFont> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();

        let (data, index) = match self.face_data.get(&id) {
            Some(hit) => hit.clone(),
            None => {
                let loaded = self
                    .db
                    .with_face_data(id, |bytes, index| (Arc::new(bytes.to_vec()), index))?;
                self.face_data.insert(id, loaded.clone());
                loaded
            }
        };

        Some(ResolvedFont {
            family,
            data,
            index,
            fallback,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
