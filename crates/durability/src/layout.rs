//! Consensus storage directory structure
//!
//! The dump tool reads one consensus group out of a journal directory:
//!
//! ```text
//! <root>/
//! └── raft/
//!     └── <group-id>/
//!         ├── current/                   # log segments
//!         │   ├── log_0-99
//!         │   └── log_inprogress_100
//!         └── sm/                        # state machine snapshots
//!             └── snapshot.<term>_<index>/
//! ```
//!
//! Nothing here takes the storage lock: the directory may be owned by a live
//! server, and the tool only ever reads from it.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Consensus group id used when none is configured.
pub const DEFAULT_GROUP_ID: Uuid = Uuid::from_u128(0x02511d47_d67c_49a3_9011_abb3109a44c1);

/// Journal directory paths for one consensus group.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
    group_id: Uuid,
}

impl StorageLayout {
    /// Create a layout for the default group under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_group(root, DEFAULT_GROUP_ID)
    }

    /// Create a layout for `group_id` under `root`.
    pub fn with_group(root: impl AsRef<Path>, group_id: Uuid) -> Self {
        StorageLayout {
            root: root.as_ref().to_path_buf(),
            group_id,
        }
    }

    /// Journal root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Consensus group id
    pub fn group_id(&self) -> Uuid {
        self.group_id
    }

    /// Directory holding all consensus groups
    pub fn raft_dir(&self) -> PathBuf {
        self.root.join("raft")
    }

    /// Directory of this consensus group
    pub fn group_dir(&self) -> PathBuf {
        self.raft_dir().join(self.group_id.to_string())
    }

    /// Log segment directory
    pub fn log_dir(&self) -> PathBuf {
        self.group_dir().join("current")
    }

    /// State machine directory holding snapshots
    pub fn state_machine_dir(&self) -> PathBuf {
        self.group_dir().join("sm")
    }

    /// Check that the journal root exists and is a directory.
    ///
    /// The group directories are not required: a journal without a log or
    /// without snapshots is still dumpable.
    pub fn validate(&self) -> Result<(), StorageLayoutError> {
        if !self.root.exists() {
            return Err(StorageLayoutError::NotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(StorageLayoutError::NotADirectory {
                path: self.root.clone(),
            });
        }
        Ok(())
    }
}

/// Journal path validation errors
#[derive(Debug, thiserror::Error)]
pub enum StorageLayoutError {
    /// Journal root not found
    #[error("Input dir does not exist: {}", path.display())]
    NotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Journal root exists but is not a directory
    #[error("Input path is not a directory: {}", path.display())]
    NotADirectory {
        /// Path that was checked
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let layout = StorageLayout::new("/journal");
        let group = format!("/journal/raft/{}", DEFAULT_GROUP_ID);

        assert_eq!(layout.group_dir(), PathBuf::from(&group));
        assert_eq!(layout.log_dir(), PathBuf::from(&group).join("current"));
        assert_eq!(layout.state_machine_dir(), PathBuf::from(&group).join("sm"));
    }

    #[test]
    fn test_default_group_id() {
        assert_eq!(
            DEFAULT_GROUP_ID.to_string(),
            "02511d47-d67c-49a3-9011-abb3109a44c1"
        );
    }

    #[test]
    fn test_custom_group() {
        let group = Uuid::new_v4();
        let layout = StorageLayout::with_group("/journal", group);
        assert!(layout.log_dir().to_string_lossy().contains(&group.to_string()));
    }

    #[test]
    fn test_validate_missing_root() {
        let dir = tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("missing"));
        assert!(matches!(
            layout.validate(),
            Err(StorageLayoutError::NotFound { .. })
        ));
    }

    #[test]
    fn test_validate_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("journal");
        std::fs::write(&file, b"x").unwrap();

        assert!(matches!(
            StorageLayout::new(&file).validate(),
            Err(StorageLayoutError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_validate_empty_root_ok() {
        let dir = tempdir().unwrap();
        assert!(StorageLayout::new(dir.path()).validate().is_ok());
    }
}
