//! Conversation history file
//!
//! History is a JSON array of [`ConversationTurn`]s, the same shape the
//! generation loop consumes, so a saved file can be passed straight back
//! with `--history`.

use docent_domain::ConversationTurn;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to access history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed history file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding prior conversation turns
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all turns; a missing file is an empty history.
    pub fn load(&self) -> Result<Vec<ConversationTurn>, HistoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| HistoryError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Append one turn and rewrite the file.
    pub fn append(&self, turn: ConversationTurn) -> Result<(), HistoryError> {
        let mut turns = self.load()?;
        turns.push(turn);

        let io_error = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(&turns).map_err(|source| {
            HistoryError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(io_error)?;
        debug!("Saved {} turn(s) to {}", turns.len(), self.path.display());
        Ok(())
    }
}
