//! State machine snapshots.
//!
//! - [`descriptor`]: locating the latest snapshot and its files
//! - [`digest`]: SHA-256 sidecars and the hashing reader
//! - [`reader`]: copying a snapshot into a verified checkpoint directory

pub mod descriptor;
pub mod digest;
pub mod reader;

pub use descriptor::{latest_snapshot, SnapshotDescriptor, SnapshotFileEntry, SnapshotId};
pub use digest::{DigestingReader, DIGEST_SUFFIX};
pub use reader::{materialize, CheckpointOutput, MaterializedSnapshot};

use std::path::{Path, PathBuf};

/// Snapshot read and reconstruction errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// I/O error on a snapshot or checkpoint path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Digest sidecar does not hold a valid digest
    #[error("Malformed digest file: {}", path.display())]
    MalformedDigest {
        /// Sidecar path
        path: PathBuf,
    },

    /// Copied bytes do not match the recorded digest
    #[error(
        "Snapshot file {} failed integrity check: expected {expected}, computed {computed}",
        path.display()
    )]
    IntegrityMismatch {
        /// Snapshot file that failed
        path: PathBuf,
        /// Recorded digest
        expected: String,
        /// Digest of the bytes read
        computed: String,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error means snapshot data is corrupt.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            SnapshotError::IntegrityMismatch { .. } | SnapshotError::MalformedDigest { .. }
        )
    }
}
