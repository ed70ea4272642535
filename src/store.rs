//! Profile persistence
//!
//! Finished profiles are written as pretty-printed JSON, one file per run,
//! under a configurable root directory. Run ids double as file names, so
//! they are validated before touching the filesystem.

use crate::profile::PersonProfile;
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Default root directory for saved profiles
pub const DEFAULT_ROOT: &str = ".dossier/profiles";

/// Errors from profile persistence
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No saved profile under the given id
    #[error("no profile saved under id '{0}'")]
    NotFound(String),

    /// Run id that cannot be used as a file name
    #[error("invalid run id '{0}'")]
    InvalidId(String),
}

impl From<StoreError> for crate::error::Error {
    fn from(err: StoreError) -> Self {
        crate::error::Error::Store(err.to_string())
    }
}

/// Generate a fresh time-derived run id.
pub fn new_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%3fZ").to_string()
}

fn validate_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | 'T' | 'Z' | '.'))
        && !id.contains("..");
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_owned()))
    }
}

/// Stores profiles as `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the default directory.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    /// Create a store rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }

    /// Save a profile under the given run id, creating the root directory
    /// if needed. Returns the path written.
    #[instrument(skip(self, profile), level = "debug")]
    pub async fn save(&self, id: &str, profile: &PersonProfile) -> Result<PathBuf, StoreError> {
        let path = self.path_for(id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(profile)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "profile saved");
        Ok(path)
    }

    /// Load a previously saved profile.
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self, id: &str) -> Result<PersonProfile, StoreError> {
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_owned()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PersonProfile;

    fn profile_named(name: &str) -> PersonProfile {
        PersonProfile {
            name: Some(name.to_owned()),
            ..PersonProfile::default()
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path());

        let saved_to = store.save("run-1", &profile_named("Jane Doe")).await.unwrap();
        assert_eq!(saved_to, dir.path().join("run-1.json"));

        let loaded = store.load("run-1").await.unwrap();
        assert_eq!(loaded.name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_saved_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path());

        let path = store.save("run-1", &profile_named("Jane Doe")).await.unwrap();
        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.contains("\n  \"name\": \"Jane Doe\""));
        // the four extension arrays are always present, even when empty
        assert!(text.contains("\"credits\": []"));
        assert!(text.contains("\"projects\": []"));
    }

    #[tokio::test]
    async fn test_load_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path());
        let err = store.load("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_traversal_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path());

        for id in ["../escape", "a/b", "", "a\\b"] {
            let err = store.save(id, &PersonProfile::default()).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidId(_)), "id: {:?}", id);
        }
    }

    #[test]
    fn test_run_ids_are_valid_and_sortable() {
        let id = new_run_id();
        assert!(validate_id(&id).is_ok());
        assert!(id.ends_with('Z'));
        assert!(id.contains('T'));
    }
}
