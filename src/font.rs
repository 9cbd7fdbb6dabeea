use std::path::Path;
use std::sync::Arc;

use usvg::fontdb::Database;

/// The set of fonts available to the canvas renderer.
///
/// Text on the canvas is resolved by family name at render time, so the book
/// normally starts from the system fonts and is topped up with any font files
/// named in the configuration. Fonts that fail to parse are skipped by the
/// underlying database rather than reported.
#[derive(Clone, Debug)]
pub struct FontBook {
    db: Arc<Database>,
}

impl FontBook {
    /// An empty book. Text drawn with it renders as nothing.
    pub fn empty() -> FontBook {
        FontBook {
            db: Arc::new(Database::new()),
        }
    }

    /// A book holding every font installed on the system
    pub fn system() -> FontBook {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        FontBook { db: Arc::new(db) }
    }

    /// Add a font file from disk
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let path = path.as_ref();
        Arc::make_mut(&mut self.db).load_font_file(path)?;
        tracing::debug!(path = %path.display(), "loaded font file");
        Ok(())
    }

    /// Whether any face in the book belongs to `family` (case-insensitive)
    pub fn has_family(&self, family: &str) -> bool {
        self.db.faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        })
    }

    /// Number of faces in the book
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub(crate) fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}

impl Default for FontBook {
    fn default() -> Self {
        FontBook::system()
    }
}
