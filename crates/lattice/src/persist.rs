//! File-backed persistence for the account snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::WrapErr;
use tracing::debug;

use lattice_core::error::CoreError;
use lattice_core::state::{StateChange, StateListener};
use lattice_core::AccountState;

/// Writes every committed snapshot to `path` as pretty JSON.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted snapshot, or `None` when the file does not exist yet.
    pub async fn load(&self) -> eyre::Result<Option<AccountState>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .wrap_err_with(|| format!("read state file {}", self.path.display()))
            }
        };
        let state = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("parse state file {}", self.path.display()))?;
        Ok(Some(state))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateListener<AccountState> for StateFile {
    async fn on_change(&self, change: &StateChange<AccountState>) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(change.snapshot().as_ref())
            .map_err(|err| CoreError::InvalidData(err.to_string()))?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), reset = change.is_reset(), "persisted account state");
        Ok(())
    }
}
