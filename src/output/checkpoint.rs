//! Binary checkpoint of a run, written at the end and accepted by `--restart`.
//!
//! The file is the bincode encoding of [`Checkpoint`]. Force terms are stored
//! by registry name and re-attached on load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::System;

pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: Vec<String>,
}

impl Checkpoint {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a checkpoint, reading the leading version tag before the rest.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let version: u32 = bincode::deserialize(bytes)?;
        if version != CHECKPOINT_VERSION {
            return Err(SimError::CheckpointVersion { found: version, expected: CHECKPOINT_VERSION });
        }
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Save a checkpoint to disk as bincode
pub fn save_checkpoint(ck: &Checkpoint, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = ck.to_bytes()?;
    fs::write(path, &data)?;
    info!(path = %path.display(), bytes = data.len(), t = ck.system.t, "checkpoint written");
    Ok(())
}

/// Load a checkpoint from disk
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint> {
    let data = fs::read(path)?;
    Checkpoint::from_bytes(&data)
}
