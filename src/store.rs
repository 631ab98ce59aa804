//! Document stores the pipeline reads from and writes to.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{CredsError, Result};

/// Source and destination of credential documents.
pub trait DocumentStore {
    /// Reads the whole document at `path`.
    fn read(&self, path: &Path) -> Result<String>;

    /// Replaces the document at `path` with `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Filesystem store.
///
/// Writes go to a sibling temp file which is synced and then renamed over the
/// destination, so a failed run never leaves a truncated file behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl DocumentStore for FileStore {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| CredsError::io(path, e))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CredsError::io(parent, e))?;
        }

        let temp_path = Self::temp_path(path);

        // The rewritten file keeps the mode of the one it replaces.
        let permissions = match fs::metadata(path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(CredsError::io(path, e)),
        };

        let result = (|| {
            let mut file = File::create(&temp_path).map_err(|e| CredsError::io(&temp_path, e))?;
            if let Some(permissions) = permissions {
                fs::set_permissions(&temp_path, permissions)
                    .map_err(|e| CredsError::io(&temp_path, e))?;
            }
            file.write_all(contents.as_bytes())
                .map_err(|e| CredsError::io(&temp_path, e))?;
            file.sync_all().map_err(|e| CredsError::io(&temp_path, e))?;
            fs::rename(&temp_path, path).map_err(|e| CredsError::io(path, e))
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }

        result
    }
}

/// In-memory store keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), contents.into());
    }

    /// Returns a copy of the document at `path`, if any.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.get(path).ok_or_else(|| {
            CredsError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            )
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.insert(path, contents);
        Ok(())
    }
}
