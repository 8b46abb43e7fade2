//! Level unlocks and best run times, kept between runs.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("failed to access progress file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt progress file {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

/// What the player has achieved so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    /// Index of the last portal the player teleported through.
    #[serde(default)]
    pub nft_index: u64,
    /// Fastest completed run, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_duration: Option<f64>,
}

impl PlayerProgress {
    /// Reads progress from `path`. A missing file is a fresh player.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgressError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(path = %path.display(), "no progress recorded yet");
                return Ok(Self::default());
            }
            Err(source) => return Err(ProgressError::Io { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&contents)
            .map_err(|source| ProgressError::Json { path: path.to_path_buf(), source })
    }

    /// Writes progress to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProgressError> {
        let path = path.as_ref();
        let io_err = |source| ProgressError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ProgressError::Json { path: path.to_path_buf(), source })?;
        fs::write(path, json).map_err(io_err)?;
        debug!(path = %path.display(), "saved progress");
        Ok(())
    }

    /// Records teleporting through portal `index`. The last portal wins, lower or not.
    pub fn unlock(&mut self, index: u64) {
        self.nft_index = index;
    }

    /// Whether the reward for `level` may be minted.
    pub fn can_mint(&self, level: U256) -> bool {
        level <= U256::from(self.nft_index)
    }

    /// Records a completed run, returning true if it is a new best. Only positive finite
    /// durations count.
    pub fn record_run(&mut self, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds <= 0.0 {
            return false;
        }
        match self.best_duration {
            Some(best) if best <= seconds => false,
            _ => {
                self.best_duration = Some(seconds);
                true
            }
        }
    }
}
