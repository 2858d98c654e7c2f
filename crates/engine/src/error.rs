//! Fatal dump errors.
//!
//! Anything that stops a run. Per-segment and per-record problems are not
//! errors at this level; they are collected in the
//! [`DumpSummary`](crate::summary::DumpSummary).

use std::path::PathBuf;

use raftdump_core::StructuralCorruption;
use raftdump_durability::{SnapshotError, StorageLayoutError};

use crate::config::ConfigError;

/// Result type for dump runs
pub type DumpResult<T> = Result<T, DumpError>;

/// A dump run aborted.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// Journal root does not exist
    #[error("Input dir does not exist: {}", path.display())]
    InputNotFound {
        /// Configured input path
        path: PathBuf,
    },

    /// Journal root is not a directory
    #[error("Input path is not a directory: {}", path.display())]
    InputNotADirectory {
        /// Configured input path
        path: PathBuf,
    },

    /// Configuration rejected before any work
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Snapshot could not be read or failed verification
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// An entry sets more than one field
    #[error(transparent)]
    StructuralCorruption(#[from] StructuralCorruption),

    /// Output could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        /// Output path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl From<StorageLayoutError> for DumpError {
    fn from(err: StorageLayoutError) -> Self {
        match err {
            StorageLayoutError::NotFound { path } => DumpError::InputNotFound { path },
            StorageLayoutError::NotADirectory { path } => DumpError::InputNotADirectory { path },
        }
    }
}

impl DumpError {
    /// Whether the snapshot failed its integrity check.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, DumpError::Snapshot(err) if err.is_integrity_failure())
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DumpError::Output {
            path: path.into(),
            source,
        }
    }
}
