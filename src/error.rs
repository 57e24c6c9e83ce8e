//! Error type shared by setup, integration and output stages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    #[error("invalid orbital elements for body `{body}`: {reason}")]
    InvalidOrbit { body: String, reason: String },

    #[error("unknown force `{0}`")]
    UnknownForce(String),

    #[error("no body named `{0}`")]
    UnknownBody(String),

    #[error("cannot integrate backwards from t = {from} to t = {to}")]
    Backwards { from: f64, to: f64 },

    #[error("integration diverged at t = {t}: body `{body}` has a non-finite state")]
    Diverged { t: f64, body: String },

    #[error("trajectory table parse error on line {line}: {reason}")]
    TableParse { line: usize, reason: String },

    #[error("checkpoint format version {found} is not supported (expected {expected})")]
    CheckpointVersion { found: u32, expected: u32 },

    #[error("checkpoint encoding error: {0}")]
    Checkpoint(#[from] bincode::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
