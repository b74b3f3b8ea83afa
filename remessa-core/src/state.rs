//! File sequence number (NSA) persistence
//!
//! The generator only reads the NSA it is handed. The host keeps the next
//! value in a small TOML file and bumps it once a file has been written.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// First NSA handed out when no state exists yet
pub const INITIAL_NSA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SequenceState {
    next_nsa: u32,
}

/// NSA counter stored in a TOML file
#[derive(Debug, Clone)]
pub struct SequenceStore {
    path: PathBuf,
    next_nsa: u32,
}

impl SequenceStore {
    /// Load the counter; a missing file starts at [`INITIAL_NSA`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let next_nsa = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let state: SequenceState = toml::from_str(&content)?;
            if state.next_nsa == 0 {
                return Err(Error::State(format!(
                    "{} holds next_nsa = 0, sequence numbers start at {}",
                    path.display(),
                    INITIAL_NSA
                )));
            }
            state.next_nsa
        } else {
            tracing::info!(
                "No sequence state at {}, starting at {}",
                path.display(),
                INITIAL_NSA
            );
            INITIAL_NSA
        };

        Ok(Self { path, next_nsa })
    }

    /// NSA to use for the next file
    pub fn current(&self) -> u32 {
        self.next_nsa
    }

    /// State file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record that `used` was consumed by a written file
    pub fn commit_after_success(&mut self, used: u32) -> Result<u32> {
        let next = used
            .checked_add(1)
            .ok_or_else(|| Error::State(format!("NSA {} cannot be incremented", used)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string(&SequenceState { next_nsa: next })?;
        std::fs::write(&self.path, content)?;
        self.next_nsa = next;

        tracing::info!("NSA {} committed, next is {}", used, next);
        Ok(next)
    }
}
