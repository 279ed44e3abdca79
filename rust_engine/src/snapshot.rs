//! Persisted view snapshots.
//!
//! A snapshot freezes the complete [`ViewState`] plus the loaded theme so
//! a view can be shared as a link and restored later. Ids are derived
//! from the serialized content, so equal states map to equal ids and
//! storing is idempotent.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use async_trait::async_trait;

use crate::db::error::{RepositoryError, RepositoryResult};
use crate::db::repository::SnapshotRepository;
use crate::models::subject::ThemeId;
use crate::models::view_state::ViewState;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while encoding or decoding snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(String),

    #[error("Malformed snapshot at '{path}': {message}")]
    Malformed { path: String, message: String },

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// A frozen view, complete enough to rebuild both charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Theme the data was loaded for, `None` for the whole archive.
    #[serde(default)]
    pub theme: Option<ThemeId>,
    pub state: ViewState,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl ViewSnapshot {
    pub fn new(theme: Option<ThemeId>, state: ViewState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            theme,
            state,
        }
    }

    /// Serialize to the canonical JSON payload ids are derived from.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialize(e.to_string()))
    }

    /// Parse a stored payload, reporting the JSON path of the first
    /// offending field on failure.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut de = serde_json::Deserializer::from_str(json);
        let snapshot: ViewSnapshot =
            serde_path_to_error::deserialize(&mut de).map_err(|e| SnapshotError::Malformed {
                path: e.path().to_string(),
                message: e.inner().to_string(),
            })?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Content-derived id of this snapshot.
    pub fn id(&self) -> Result<String, SnapshotError> {
        Ok(content_id(&self.to_json()?))
    }
}

/// Calculate the SHA-256 id of a serialized snapshot payload.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

// ==================== File-backed store ====================

/// Snapshot store writing one JSON file per snapshot.
///
/// Suitable for single-host deployments and for keeping shareable links
/// alive across restarts without a database.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SnapshotRepository for FileSnapshotStore {
    async fn store_snapshot(&self, snapshot: &ViewSnapshot) -> RepositoryResult<String> {
        let json = snapshot
            .to_json()
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let id = content_id(&json);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RepositoryError::InternalError(format!("create {:?}: {e}", self.dir)))?;
        tokio::fs::write(self.path_for(&id), json)
            .await
            .map_err(|e| RepositoryError::InternalError(format!("write snapshot {id}: {e}")))?;
        Ok(id)
    }

    async fn load_snapshot(&self, id: &str) -> RepositoryResult<ViewSnapshot> {
        let path = self.path_for(id);
        let payload = match tokio::fs::read_to_string(&path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(format!(
                    "Snapshot {} not found",
                    id
                )));
            }
            Err(e) => {
                return Err(RepositoryError::InternalError(format!(
                    "read snapshot {id}: {e}"
                )));
            }
        };

        ViewSnapshot::from_json(&payload)
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))
    }

    async fn list_snapshots(&self) -> RepositoryResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(RepositoryError::InternalError(format!(
                    "list {:?}: {e}",
                    self.dir
                )));
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}
