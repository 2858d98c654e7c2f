//! Snapshot materialization.
//!
//! Copies the latest snapshot into a checkpoint directory under the output
//! root, verifying recorded digests on the way. A digest mismatch removes the
//! partially written checkpoint so no unverified copy is left behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::snapshot::descriptor::{SnapshotDescriptor, SnapshotFileEntry};
use crate::snapshot::digest::DigestingReader;
use crate::snapshot::SnapshotError;

/// One file written into the checkpoint directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointOutput {
    /// Path relative to the checkpoint directory
    pub relative_path: PathBuf,
    /// Path of the written copy
    pub path: PathBuf,
    /// Bytes copied
    pub bytes: u64,
    /// Whether a recorded digest was checked
    pub verified: bool,
}

/// A snapshot reconstructed on disk.
#[derive(Debug, Clone)]
pub struct MaterializedSnapshot {
    /// Checkpoint directory
    pub dir: PathBuf,
    /// Files written, in snapshot order
    pub files: Vec<CheckpointOutput>,
}

impl MaterializedSnapshot {
    /// Total bytes copied.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    /// Files copied without a recorded digest.
    pub fn unverified(&self) -> impl Iterator<Item = &CheckpointOutput> {
        self.files.iter().filter(|f| !f.verified)
    }
}

/// Copy `snapshot` into `<output_root>/<index>-<mtime>`.
pub fn materialize(
    snapshot: &SnapshotDescriptor,
    output_root: &Path,
) -> Result<MaterializedSnapshot, SnapshotError> {
    let dir = output_root.join(snapshot.checkpoint_dir_name());
    fs::create_dir_all(&dir).map_err(|e| SnapshotError::io(&dir, e))?;

    let mut files = Vec::with_capacity(snapshot.files.len());
    for entry in &snapshot.files {
        match copy_verified(&snapshot.dir, &dir, entry) {
            Ok(output) => files.push(output),
            Err(err) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    tracing::warn!(
                        dir = %dir.display(),
                        error = %cleanup,
                        "Failed to remove incomplete checkpoint"
                    );
                }
                return Err(err);
            }
        }
    }

    tracing::info!(
        snapshot = %snapshot.id,
        dir = %dir.display(),
        files = files.len(),
        "Snapshot materialized"
    );
    Ok(MaterializedSnapshot { dir, files })
}

fn copy_verified(
    source_dir: &Path,
    target_dir: &Path,
    entry: &SnapshotFileEntry,
) -> Result<CheckpointOutput, SnapshotError> {
    let source = source_dir.join(&entry.relative_path);
    let target = target_dir.join(&entry.relative_path);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
    }

    let file = File::open(&source).map_err(|e| SnapshotError::io(&source, e))?;
    let mut reader = DigestingReader::new(BufReader::new(file));
    let out = File::create(&target).map_err(|e| SnapshotError::io(&target, e))?;
    let mut writer = BufWriter::new(out);

    io::copy(&mut reader, &mut writer).map_err(|e| SnapshotError::io(&source, e))?;
    writer.flush().map_err(|e| SnapshotError::io(&target, e))?;

    let bytes = reader.bytes_read();
    let computed = reader.finalize_hex();

    let verified = match &entry.digest {
        Some(expected) if *expected != computed => {
            return Err(SnapshotError::IntegrityMismatch {
                path: source,
                expected: expected.clone(),
                computed,
            });
        }
        Some(_) => true,
        None => {
            tracing::debug!(file = %source.display(), "No recorded digest, copied unverified");
            false
        }
    };

    Ok(CheckpointOutput {
        relative_path: entry.relative_path.clone(),
        path: target,
        bytes,
        verified,
    })
}
