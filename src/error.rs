//! Error types shared by the brain, persistence and runtime layers

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrainError {
    /// A vector fed to the network does not match the layer width
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("corrupt brain data: {0}")]
    CorruptBrain(String),
    #[error("no saved brain at {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    #[error("brain i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl BrainError {
    /// Load failures that are expected in normal operation (first run, damaged file)
    pub fn is_recoverable_load(&self) -> bool {
        matches!(self, BrainError::CorruptBrain(_) | BrainError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum LoopError {
    #[error(transparent)]
    Brain(#[from] BrainError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to spawn thread: {0}")]
    Spawn(std::io::Error),
    #[error("simulation state was lost when the loop thread panicked")]
    StateLost,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}
