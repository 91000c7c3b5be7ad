//! Markdown sources on the local filesystem.
//!
//! Posts live in a content directory as `<id>.md`. Ids and sub-directories
//! come from requests, so both are validated before they touch the
//! filesystem: an id is a single path component, a directory is a relative
//! path that never leaves the root.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::ContentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A store rooted at `directory` below this one.
    pub fn subdirectory(&self, directory: &str) -> Result<Self, ContentError> {
        let relative = Path::new(directory);
        let confined = !directory.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(ContentError::InvalidName(directory.to_string()));
        }
        Ok(Self::new(self.root.join(relative)))
    }

    /// Path of `<id>.md`, after validating `id`.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, ContentError> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.md")))
    }

    /// Read the markdown source for `id`.
    pub fn read(&self, id: &str) -> Result<String, ContentError> {
        let path = self.path_for(id)?;
        match std::fs::read_to_string(&path) {
            Ok(markdown) => {
                debug!(path = %path.display(), bytes = markdown.len(), "loaded markdown source");
                Ok(markdown)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ContentError::NotFound(path)),
            Err(source) => Err(ContentError::Io { path, source }),
        }
    }

    /// [`ContentStore::read`] on tokio's blocking pool, for async callers.
    #[cfg(feature = "pdf")]
    pub async fn read_async(&self, id: &str) -> Result<String, ContentError> {
        let path = self.path_for(id)?;
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.read(&id))
            .await
            .map_err(|err| ContentError::Io { path, source: std::io::Error::other(err) })?
    }

    /// Ids of all `.md` files directly in the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, ContentError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ContentError::NotFound(self.root.clone()),
            _ => ContentError::Io { path: self.root.clone(), source },
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

fn validate_id(id: &str) -> Result<(), ContentError> {
    let valid = !id.trim().is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(ContentError::InvalidName(id.to_string()))
    }
}
