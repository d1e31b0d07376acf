//! Document sources.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{DocumentError, DocumentResult, PreferencesDocument};

/// Where a document is loaded from and persisted to.
pub trait DocumentStore {
    /// Load and parse the current document.
    fn load(&mut self) -> DocumentResult<PreferencesDocument>;

    /// Replace the stored document with `document`, atomically.
    fn persist(&mut self, document: &PreferencesDocument) -> DocumentResult<()>;

    /// Human-readable location, used in logs.
    fn location(&self) -> String;
}

/// A document on the local filesystem.
///
/// Remembers the text it last loaded or wrote, and refuses to persist over
/// a file that changed on disk in the meantime.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    last_seen: Option<String>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_seen: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_unmodified(&self) -> DocumentResult<()> {
        let Some(expected) = &self.last_seen else {
            return Ok(());
        };

        match fs::read_to_string(&self.path) {
            Ok(current) if current == *expected => Ok(()),
            Ok(_) => Err(DocumentError::Modified(self.path.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(DocumentError::Modified(self.path.clone()))
            }
            Err(source) => Err(DocumentError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl DocumentStore for FileStore {
    fn load(&mut self) -> DocumentResult<PreferencesDocument> {
        let document = PreferencesDocument::load(&self.path)?;
        self.last_seen = Some(document.as_str().to_string());
        Ok(document)
    }

    fn persist(&mut self, document: &PreferencesDocument) -> DocumentResult<()> {
        self.check_unmodified()?;
        document.persist(&self.path)?;
        self.last_seen = Some(document.as_str().to_string());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `content` to `path` through a sibling temp file and a rename.
///
/// Creates the parent directory if needed.
pub(crate) fn write_atomically(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' has no file name", path.display()),
        )
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    Ok(())
}
