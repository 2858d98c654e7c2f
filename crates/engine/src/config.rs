//! Dump configuration
//!
//! Everything a single dump run needs: where to read, where to write, and
//! which entries to keep.

use std::path::{Path, PathBuf};

use raftdump_core::{DumpRange, RangeError};
use raftdump_durability::{StorageLayout, DEFAULT_GROUP_ID};
use uuid::Uuid;

/// Default name of the rendered entry file inside the output directory.
pub const DEFAULT_ENTRY_FILE_NAME: &str = "edits.txt";

/// Dump run configuration
#[derive(Debug, Clone)]
pub struct DumpConfig {
    /// Journal root containing `raft/<group-id>`
    pub input_dir: PathBuf,
    /// Output root for the entry file and checkpoint tree
    pub output_dir: PathBuf,
    /// Target shard (owner) name
    pub shard: String,
    /// Inclusive start sequence
    pub start: u64,
    /// Exclusive end sequence
    pub end: u64,
    /// Consensus group to read
    pub group_id: Uuid,
    /// Entry file name within `output_dir`
    pub entry_file_name: String,
}

impl DumpConfig {
    /// Create a config covering every sequence number of `shard`.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        shard: impl Into<String>,
    ) -> Self {
        DumpConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            shard: shard.into(),
            start: 0,
            end: u64::MAX,
            group_id: DEFAULT_GROUP_ID,
            entry_file_name: DEFAULT_ENTRY_FILE_NAME.to_string(),
        }
    }

    /// Set inclusive start sequence
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Set exclusive end sequence
    pub fn with_end(mut self, end: u64) -> Self {
        self.end = end;
        self
    }

    /// Set consensus group id
    pub fn with_group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = group_id;
        self
    }

    /// Set entry file name
    pub fn with_entry_file_name(mut self, name: impl Into<String>) -> Self {
        self.entry_file_name = name.into();
        self
    }

    /// Storage layout of the configured group.
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::with_group(&self.input_dir, self.group_id)
    }

    /// Filter criteria.
    pub fn range(&self) -> Result<DumpRange, ConfigError> {
        Ok(DumpRange::new(self.shard.clone(), self.start, self.end)?)
    }

    /// Path of the rendered entry file.
    pub fn entry_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.entry_file_name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard.trim().is_empty() {
            return Err(ConfigError::EmptyShard);
        }
        self.range()?;

        let name = Path::new(&self.entry_file_name);
        let is_plain_name = name.file_name().map_or(false, |n| n == name.as_os_str());
        if !is_plain_name {
            return Err(ConfigError::InvalidEntryFileName(
                self.entry_file_name.clone(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No target shard given
    #[error("Shard name must not be empty")]
    EmptyShard,

    /// Invalid sequence range
    #[error("Invalid range: {0}")]
    InvalidRange(#[from] RangeError),

    /// Entry file name is not a plain file name
    #[error("Invalid entry file name: {0:?}")]
    InvalidEntryFileName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DumpConfig::new("/journal", "/out", "BlockMaster");
        assert_eq!(config.start, 0);
        assert_eq!(config.end, u64::MAX);
        assert_eq!(config.group_id, DEFAULT_GROUP_ID);
        assert_eq!(config.entry_file_path(), PathBuf::from("/out/edits.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let group = Uuid::new_v4();
        let config = DumpConfig::new("/journal", "/out", "MetaMaster")
            .with_start(10)
            .with_end(20)
            .with_group_id(group)
            .with_entry_file_name("meta.txt");

        let range = config.range().unwrap();
        assert_eq!((range.start(), range.end()), (10, 20));
        assert_eq!(config.layout().group_id(), group);
        assert_eq!(config.entry_file_path(), PathBuf::from("/out/meta.txt"));
    }

    #[test]
    fn test_start_after_end_rejected() {
        let config = DumpConfig::new("/journal", "/out", "BlockMaster")
            .with_start(8)
            .with_end(3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(RangeError::StartAfterEnd { .. }))
        ));
    }

    #[test]
    fn test_empty_shard_rejected() {
        let config = DumpConfig::new("/journal", "/out", " ");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyShard)));
    }

    #[test]
    fn test_entry_file_name_must_be_plain() {
        for bad in ["", "..", "sub/edits.txt", "/tmp/edits.txt"] {
            let config =
                DumpConfig::new("/journal", "/out", "BlockMaster").with_entry_file_name(bad);
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidEntryFileName(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
