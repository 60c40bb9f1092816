//! Static lexicon and persona documents.
//!
//! Both documents are JSON, parsed and validated once at startup into an
//! immutable [`Catalog`]. Any problem is reported as a [`CatalogError`]; the
//! simulator never runs on a partially loaded catalog.

pub mod lexicon;
pub mod persona;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

pub use self::lexicon::{Lexicon, TermSet, CORE_EMOTIONS};
pub use self::persona::{
    ContradictionStyle, MaskStyle, PersonaStore, PersonaSummary, PersonaTraits,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating catalog documents.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document could not be read from disk.
    #[error("failed to read {document} document at {}: {source}", path.display())]
    Read {
        /// Which document (`lexicon` or `personas`).
        document: &'static str,
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("malformed {document} document: {source}")]
    Parse {
        /// Which document (`lexicon` or `personas`).
        document: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A lexicon category contains an empty or whitespace-only entry.
    #[error("blank entry in lexicon category '{category}'")]
    BlankTerm {
        /// Category holding the blank entry.
        category: String,
    },
    /// An emotion or tone was declared with an empty name.
    #[error("blank category name under lexicon '{group}'")]
    BlankCategory {
        /// `emotions` or `tones`.
        group: &'static str,
    },
    /// A phrase entry could not be compiled into a matcher.
    #[error("invalid lexicon phrase '{phrase}': {source}")]
    Phrase {
        /// The offending phrase.
        phrase: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },
    /// A persona record has an empty required field.
    #[error("persona #{index} has a blank {field}")]
    BlankField {
        /// Zero-based position in the persona document.
        index: usize,
        /// Field name.
        field: &'static str,
    },
    /// Two persona records share an id.
    #[error("duplicate persona id '{id}'")]
    DuplicatePersona {
        /// The repeated id.
        id: String,
    },
    /// A persona prior names an emotion the lexicon does not declare.
    #[error("persona '{persona}' has a prior for unknown emotion '{emotion}'")]
    UnknownEmotion {
        /// Persona id.
        persona: String,
        /// Undeclared emotion name.
        emotion: String,
    },
    /// A persona priority names a tone the lexicon does not declare.
    #[error("persona '{persona}' has a priority for unknown value '{value}'")]
    UnknownValue {
        /// Persona id.
        persona: String,
        /// Undeclared value (tone) name.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Validated, immutable lexicon + persona pair.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Keyword lexicon.
    pub lexicon: Arc<Lexicon>,
    /// Persona records in document order.
    pub personas: Arc<PersonaStore>,
}

impl Catalog {
    /// Load both documents from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if either file is unreadable, malformed, or
    /// fails validation.
    pub fn load(lexicon_path: &Path, personas_path: &Path) -> Result<Self, CatalogError> {
        let lexicon_json = read_document("lexicon", lexicon_path)?;
        let personas_json = read_document("personas", personas_path)?;
        let catalog = Self::from_json(&lexicon_json, &personas_json)?;
        info!(
            lexicon = %lexicon_path.display(),
            personas = %personas_path.display(),
            persona_count = catalog.personas.len(),
            emotion_count = catalog.lexicon.emotions().len(),
            tone_count = catalog.lexicon.tones().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory JSON documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if either document is malformed or fails
    /// validation.
    pub fn from_json(lexicon_json: &str, personas_json: &str) -> Result<Self, CatalogError> {
        let lexicon = Lexicon::from_json(lexicon_json)?;
        let personas = PersonaStore::from_json(personas_json, &lexicon)?;
        Ok(Self {
            lexicon: Arc::new(lexicon),
            personas: Arc::new(personas),
        })
    }
}

fn read_document(document: &'static str, path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        document,
        path: path.to_path_buf(),
        source,
    })
}
