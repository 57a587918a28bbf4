use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::MonitorState;
use crate::Result;
use crate::utils::fs;

/// Read/write-whole-document persistence for [`MonitorState`].
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last persisted state.
    ///
    /// Never fails: a missing, unreadable or mismatched document yields
    /// [`MonitorState::default`].
    async fn load(&self) -> MonitorState;

    /// Overwrite the persisted state.
    async fn save(&self, state: &MonitorState) -> Result<()>;
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> MonitorState {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet, starting empty");
                return MonitorState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read state file, starting empty");
                return MonitorState::default();
            }
        };

        match serde_json::from_slice::<MonitorState>(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "State file is not a valid document, starting empty");
                MonitorState::default()
            }
        }
    }

    async fn save(&self, state: &MonitorState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        fs::write_atomic(&self.path, &json).await?;
        debug!(
            path = %self.path.display(),
            known = state.known_ids.len(),
            watching = state.watch_list.len(),
            "State persisted"
        );
        Ok(())
    }
}
