//! Snapshot discovery.
//!
//! Snapshots live in the state machine directory as
//! `snapshot.<term>_<index>/`. The latest one is the directory with the
//! greatest `(term, index)`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::snapshot::digest::{is_sidecar, parse_sidecar, sidecar_path};
use crate::snapshot::SnapshotError;

const SNAPSHOT_DIR_PREFIX: &str = "snapshot.";

/// Snapshot recency: ordered by term, then index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId {
    /// Leader term of the last included entry
    pub term: u64,
    /// Log index of the last included entry
    pub index: u64,
}

impl SnapshotId {
    /// Create a snapshot id.
    pub fn new(term: u64, index: u64) -> Self {
        SnapshotId { term, index }
    }

    /// Directory name for this snapshot.
    pub fn dir_name(&self) -> String {
        format!("{}{}_{}", SNAPSHOT_DIR_PREFIX, self.term, self.index)
    }

    /// Parse a snapshot directory name.
    pub fn parse_dir_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(SNAPSHOT_DIR_PREFIX)?;
        let (term, index) = rest.split_once('_')?;
        if !is_decimal(term) || !is_decimal(index) {
            return None;
        }
        Some(SnapshotId {
            term: term.parse().ok()?,
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(t:{}, i:{})", self.term, self.index)
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// One file recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFileEntry {
    /// Path relative to the snapshot directory
    pub relative_path: PathBuf,
    /// Recorded hex digest, if the file is protected
    pub digest: Option<String>,
}

/// Latest snapshot metadata.
#[derive(Debug, Clone)]
pub struct SnapshotDescriptor {
    /// Snapshot recency
    pub id: SnapshotId,
    /// Snapshot directory
    pub dir: PathBuf,
    /// Directory modification time, milliseconds since the Unix epoch
    pub last_modified_ms: u64,
    /// Files in relative-path order
    pub files: Vec<SnapshotFileEntry>,
}

impl SnapshotDescriptor {
    /// Load the descriptor of the snapshot stored in `dir`.
    pub fn load(id: SnapshotId, dir: &Path) -> Result<Self, SnapshotError> {
        let metadata = fs::metadata(dir).map_err(|e| SnapshotError::io(dir, e))?;
        let last_modified_ms = metadata
            .modified()
            .map_err(|e| SnapshotError::io(dir, e))?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut relative_paths = Vec::new();
        collect_files(dir, Path::new(""), &mut relative_paths)?;
        relative_paths.sort();

        let files = relative_paths
            .into_iter()
            .map(|relative_path| {
                let digest = read_recorded_digest(&dir.join(&relative_path))?;
                Ok(SnapshotFileEntry {
                    relative_path,
                    digest,
                })
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;

        Ok(SnapshotDescriptor {
            id,
            dir: dir.to_path_buf(),
            last_modified_ms,
            files,
        })
    }

    /// Name of the checkpoint directory this snapshot is reconstructed into.
    pub fn checkpoint_dir_name(&self) -> String {
        format!("{}-{}", self.id.index, self.last_modified_ms)
    }
}

/// Find the latest snapshot under the state machine directory.
///
/// A missing directory or one without snapshots yields `Ok(None)`.
pub fn latest_snapshot(sm_dir: &Path) -> Result<Option<SnapshotDescriptor>, SnapshotError> {
    let entries = match fs::read_dir(sm_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::io(sm_dir, e)),
    };

    let mut latest: Option<(SnapshotId, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| SnapshotError::io(sm_dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(id) = SnapshotId::parse_dir_name(&name) else {
            continue;
        };
        if !entry.path().is_dir() {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| id > *best) {
            latest = Some((id, entry.path()));
        }
    }

    latest
        .map(|(id, dir)| SnapshotDescriptor::load(id, &dir))
        .transpose()
}

/// Recursively collect regular files below `dir`, skipping digest sidecars.
fn collect_files(
    root: &Path,
    relative: &Path,
    out: &mut Vec<PathBuf>,
) -> Result<(), SnapshotError> {
    let dir = root.join(relative);
    let entries = fs::read_dir(&dir).map_err(|e| SnapshotError::io(&dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SnapshotError::io(&dir, e))?;
        let file_type = entry.file_type().map_err(|e| SnapshotError::io(&entry.path(), e))?;
        let child = relative.join(entry.file_name());
        if file_type.is_dir() {
            collect_files(root, &child, out)?;
        } else if file_type.is_file() && !is_sidecar(&child) {
            out.push(child);
        }
    }
    Ok(())
}

/// Read the digest recorded for `file`, if it has a sidecar.
fn read_recorded_digest(file: &Path) -> Result<Option<String>, SnapshotError> {
    let sidecar = sidecar_path(file);
    let contents = match fs::read_to_string(&sidecar) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::io(&sidecar, e)),
    };
    parse_sidecar(&contents)
        .map(Some)
        .ok_or(SnapshotError::MalformedDigest { path: sidecar })
}
