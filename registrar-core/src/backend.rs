//! Key/blob persistence for the five store collections.
//!
//! Each collection is stored under its own key as a YAML sequence of
//! records in insertion order. The [`Backend`] trait only moves opaque
//! text; (de)serialization lives in the store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Storage medium for serialized collections.
pub trait Backend {
    /// Contents stored under `key`, or `None` if nothing was ever saved.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace whatever is stored under `key`.
    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// One YAML file per key inside a data directory.
///
/// Write flow: contents → `<key>.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The `.tmp` file is always in the same directory as the target, so the
/// rename never crosses filesystems.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`. The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<key>.yaml` — pure, no I/O.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.yaml"))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
            set_dir_permissions(&self.dir)?;
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!(key, path = %path.display(), "no stored collection");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        tracing::debug!(key, path = %path.display(), bytes = contents.len(), "loaded collection");
        Ok(Some(contents))
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        let tmp_path = path.with_file_name(format!("{key}.yaml.tmp"));

        std::fs::write(&tmp_path, contents)?;
        set_file_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &path)?;
        tracing::debug!(key, path = %path.display(), bytes = contents.len(), "saved collection");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local map, for tests and throwaway stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl Backend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.blobs.insert(key.to_owned(), contents.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
