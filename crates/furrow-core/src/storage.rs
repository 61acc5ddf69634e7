//! Profile persistence.
//!
//! The core only needs the [`ProfileStore`] contract: load every record,
//! save every record. [`YamlProfileStore`] keeps them in a single YAML
//! document:
//!
//! ```yaml
//! saved_at: 2026-05-01T12:00:00Z
//! players:
//!   0190c6a2-...:
//!     name: Steve
//!     xp: 1250
//! ```
//!
//! Saves are whole-document and atomic: the new content goes to a sibling
//! temporary file which is then renamed over the target.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use furrow_types::{ActorId, ProfileRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors that can occur when reading or writing profiles.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("profile storage I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The profile document could not be parsed or serialized.
    #[error("profile storage YAML error: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for StorageError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Bulk load/save contract for progression records.
pub trait ProfileStore {
    /// Read every persisted record. A store with nothing saved yet returns
    /// an empty list.
    fn load(&self) -> Result<Vec<ProfileRecord>, StorageError>;

    /// Replace the persisted set with `records`.
    fn save(&self, records: &[ProfileRecord]) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// YAML document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlayersDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    players: BTreeMap<String, PlayerEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlayerEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    xp: u64,
}

// ---------------------------------------------------------------------------
// YamlProfileStore
// ---------------------------------------------------------------------------

/// [`ProfileStore`] backed by one YAML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlProfileStore {
    path: PathBuf,
}

impl YamlProfileStore {
    /// Create a store for the file at `path`. Nothing is read until
    /// [`ProfileStore::load`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "players".to_owned(), |n| n.to_string_lossy().into_owned());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::now_v7().simple()))
    }
}

impl ProfileStore for YamlProfileStore {
    fn load(&self) -> Result<Vec<ProfileRecord>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No profile file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: PlayersDocument = serde_yml::from_str(&contents)?;
        let mut records = Vec::with_capacity(document.players.len());
        for (key, entry) in document.players {
            let Some(actor_id) = ActorId::parse(&key) else {
                warn!(key = %key, "Skipping profile with malformed actor id");
                continue;
            };
            records.push(ProfileRecord {
                actor_id,
                display_name: entry.name,
                xp: entry.xp,
            });
        }
        Ok(records)
    }

    fn save(&self, records: &[ProfileRecord]) -> Result<(), StorageError> {
        let document = PlayersDocument {
            saved_at: Some(Utc::now()),
            players: records
                .iter()
                .map(|record| {
                    (
                        record.actor_id.to_string(),
                        PlayerEntry {
                            name: record.display_name.clone(),
                            xp: record.xp,
                        },
                    )
                })
                .collect(),
        };
        let yaml = serde_yml::to_string(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        std::fs::write(&temp, yaml)?;
        if let Err(err) = std::fs::rename(&temp, &self.path) {
            std::fs::remove_file(&temp).ok();
            return Err(err.into());
        }
        Ok(())
    }
}
