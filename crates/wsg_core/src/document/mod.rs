//! The preferences document and where it lives.
//!
//! A [`PreferencesDocument`] owns the exact source text of the file. Reads
//! go through a fresh `roxmltree` parse; writes are byte-range splices, so
//! nodes the registry does not know about are carried through untouched.

mod edit;
mod store;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub(crate) use edit::{TextEdit, TextSlot};
pub use store::{DocumentStore, FileStore};
pub(crate) use store::write_atomically;

/// Errors raised while loading, editing or persisting a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Preferences file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed XML at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("Failed to write '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{0}' was modified by another writer since it was loaded")]
    Modified(PathBuf),

    #[error("Edit would leave the document malformed: {0}")]
    EditRejected(String),
}

impl DocumentError {
    fn from_xml(err: &roxmltree::Error) -> Self {
        let pos = err.pos();
        Self::Parse {
            message: err.to_string(),
            line: pos.row,
            column: pos.col,
        }
    }
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Parse `text` with the options every reader in this crate uses.
pub(crate) fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>, roxmltree::Error> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options)
}

/// In-memory copy of a `preferences.xml` file.
///
/// Always well-formed: construction and every edit re-parse the text and
/// refuse anything the parser rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesDocument {
    text: String,
    origin: Option<PathBuf>,
}

impl PreferencesDocument {
    /// Parse a document from text.
    pub fn parse(text: impl Into<String>) -> DocumentResult<Self> {
        let text = text.into();
        if let Err(err) = parse_xml(&text) {
            return Err(DocumentError::from_xml(&err));
        }
        Ok(Self { text, origin: None })
    }

    /// Load and parse a document from disk.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut document = Self::parse(text)?;
        document.origin = Some(path.to_path_buf());
        tracing::info!("Loaded preferences from {}", path.display());
        Ok(document)
    }

    /// Write the document to `path` atomically.
    pub fn persist(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        write_atomically(path, &self.text).map_err(|source| DocumentError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// The exact document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Path this document was loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Parse tree borrowing the document text.
    pub fn tree(&self) -> DocumentResult<roxmltree::Document<'_>> {
        parse_xml(&self.text).map_err(|err| DocumentError::from_xml(&err))
    }

    /// Apply a batch of edits as one unit.
    ///
    /// Returns how many edits were applied. If the result does not parse,
    /// nothing changes.
    pub(crate) fn apply(&mut self, edits: Vec<TextEdit>) -> DocumentResult<usize> {
        if edits.is_empty() {
            return Ok(0);
        }
        let count = edits.len();
        let updated = edit::splice(&self.text, edits);
        if let Err(err) = parse_xml(&updated) {
            return Err(DocumentError::EditRejected(err.to_string()));
        }
        self.text = updated;
        Ok(count)
    }
}
