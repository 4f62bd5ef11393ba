//! # Font Faces
//!
//! Text objects name a font by family (`"Inter"`, `"Georgia"`...) plus bold and italic flags.
//! This resolves that request against a `fontdb` database, falling back to any sans-serif face
//! when the family isn't installed, and hands out shapeable `rustybuzz` faces.

/// Location of fonts shipped alongside mugsmith for the user, searched in addition to the
/// system fonts.
#[must_use]
pub fn local_fonts() -> Option<std::path::PathBuf> {
    // *Not* LocalData, as we'd like this data to be available on Windows network logins.
    let mut data = dirs::data_dir()?;
    data.push("mugsmith");
    data.push("fonts");
    Some(data)
}

/// The variation of a family requested by a text object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FaceRequest<'a> {
    pub family: &'a str,
    pub bold: bool,
    pub italic: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum FaceError {
    #[error("no face available for family {0:?}")]
    Unavailable(String),
    #[error("parsing error")]
    BadFace,
}

/// Database of every face available to the text renderer.
pub struct Fonts {
    db: fontdb::Database,
}
impl Fonts {
    /// Create the database from predefined system font folders, and the mugsmith local fonts.
    #[must_use]
    pub fn new_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(locals) = local_fonts() {
            // This directory may not even exist. Fails silently (desired behavior)
            db.load_fonts_dir(locals);
        }
        log::info!("font database holds {} faces", db.len());
        Self { db }
    }
    /// A database with no faces at all. Every text resolves as unavailable.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }
    /// Add a single font file's faces, e.g. a bundled fallback.
    pub fn load_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.db.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
    /// Find the best face for the request, or None if not even a fallback exists.
    #[must_use]
    pub fn resolve(&self, request: FaceRequest<'_>) -> Option<fontdb::ID> {
        let families = [
            fontdb::Family::Name(request.family),
            fontdb::Family::SansSerif,
        ];
        let query = fontdb::Query {
            families: &families,
            weight: if request.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if request.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        self.db.query(&query).or_else(|| {
            // Generic families may be unmapped on minimal systems. Anything is better than nothing.
            self.db.faces().next().map(|face| face.id)
        })
    }
    /// Run `f` with a shaping face for the request.
    pub fn with_face<R>(
        &self,
        request: FaceRequest<'_>,
        f: impl FnOnce(&rustybuzz::Face<'_>) -> R,
    ) -> Result<R, FaceError> {
        let id = self
            .resolve(request)
            .ok_or_else(|| FaceError::Unavailable(request.family.to_owned()))?;
        self.db
            .with_face_data(id, |data, index| {
                rustybuzz::Face::from_slice(data, index).map(|face| f(&face))
            })
            // Outer none: the id vanished. Inner: data didn't parse.
            .ok_or_else(|| FaceError::Unavailable(request.family.to_owned()))?
            .ok_or(FaceError::BadFace)
    }
}
impl Default for Fonts {
    fn default() -> Self {
        Self::empty()
    }
}
