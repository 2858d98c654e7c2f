//! Operation payloads carried by journal entries.
//!
//! Each payload struct is one semantic field of [`JournalEntry`]. The
//! borrowed [`Operation`] enum is the tagged view used once an entry has been
//! checked to carry exactly one of them.
//!
//! [`JournalEntry`]: crate::entry::JournalEntry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shard::Shard;

/// Next block container id handed out by the block allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockContainerIdGeneratorEntry {
    /// Next container id
    pub next_container_id: u64,
}

/// Block metadata committed by a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockInfoEntry {
    /// Block id
    pub block_id: u64,
    /// Block length in bytes
    pub length: u64,
}

/// Block removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteBlockEntry {
    /// Block id
    pub block_id: u64,
}

/// Directory inode creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InodeDirectoryEntry {
    /// Inode id
    pub id: u64,
    /// Parent inode id
    pub parent_id: u64,
    /// Name within the parent
    pub name: String,
    /// POSIX mode bits
    pub mode: u32,
}

/// File inode creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InodeFileEntry {
    /// Inode id
    pub id: u64,
    /// Parent inode id
    pub parent_id: u64,
    /// Name within the parent
    pub name: String,
    /// File length in bytes
    pub length: u64,
    /// Block size in bytes
    pub block_size_bytes: u64,
}

/// Partial inode update; absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateInodeEntry {
    /// Inode id
    pub id: u64,
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New modification time (ms since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modification_time_ms: Option<u64>,
}

/// File or directory deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteFileEntry {
    /// Inode id
    pub id: u64,
    /// Whether children were deleted too
    pub recursive: bool,
    /// Operation time (ms since epoch)
    pub op_time_ms: u64,
}

/// Inode move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameEntry {
    /// Inode id
    pub id: u64,
    /// Destination parent inode id
    pub new_parent_id: u64,
    /// Destination name
    pub new_name: String,
    /// Operation time (ms since epoch)
    pub op_time_ms: u64,
}

/// Mount table addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddMountPointEntry {
    /// Path in the namespace
    pub mount_path: String,
    /// Under-storage location
    pub ufs_path: String,
    /// Mount id
    pub mount_id: u64,
    /// Read-only mount
    pub read_only: bool,
}

/// Mount table removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteMountPointEntry {
    /// Path in the namespace
    pub mount_path: String,
}

/// Cluster identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterInfoEntry {
    /// Cluster id
    pub cluster_id: String,
}

/// Path-level configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPropertiesEntry {
    /// Path the properties apply to
    pub path: String,
    /// Property key/value pairs
    pub properties: BTreeMap<String, String>,
}

/// Removal of path-level configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovePathPropertiesEntry {
    /// Path the properties applied to
    pub path: String,
}

/// Table catalog addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddTableEntry {
    /// Database name
    pub db_name: String,
    /// Table name
    pub table_name: String,
}

/// Operation contributed by a plugin.
///
/// The owner is carried in the entry itself; an extension without an owner
/// cannot be attributed to any shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionEntry {
    /// Plugin-defined operation kind
    pub kind: String,
    /// Owning shard name, if the plugin declares one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Opaque plugin payload
    pub data: Vec<u8>,
}

/// One concrete operation, borrowed from the entry that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// See [`BlockContainerIdGeneratorEntry`]
    BlockContainerIdGenerator(&'a BlockContainerIdGeneratorEntry),
    /// See [`BlockInfoEntry`]
    BlockInfo(&'a BlockInfoEntry),
    /// See [`DeleteBlockEntry`]
    DeleteBlock(&'a DeleteBlockEntry),
    /// See [`InodeDirectoryEntry`]
    InodeDirectory(&'a InodeDirectoryEntry),
    /// See [`InodeFileEntry`]
    InodeFile(&'a InodeFileEntry),
    /// See [`UpdateInodeEntry`]
    UpdateInode(&'a UpdateInodeEntry),
    /// See [`DeleteFileEntry`]
    DeleteFile(&'a DeleteFileEntry),
    /// See [`RenameEntry`]
    Rename(&'a RenameEntry),
    /// See [`AddMountPointEntry`]
    AddMountPoint(&'a AddMountPointEntry),
    /// See [`DeleteMountPointEntry`]
    DeleteMountPoint(&'a DeleteMountPointEntry),
    /// See [`ClusterInfoEntry`]
    ClusterInfo(&'a ClusterInfoEntry),
    /// See [`PathPropertiesEntry`]
    PathProperties(&'a PathPropertiesEntry),
    /// See [`RemovePathPropertiesEntry`]
    RemovePathProperties(&'a RemovePathPropertiesEntry),
    /// See [`AddTableEntry`]
    AddTable(&'a AddTableEntry),
    /// See [`ExtensionEntry`]
    Extension(&'a ExtensionEntry),
}

impl<'a> Operation<'a> {
    /// Field name of this operation within a journal entry.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::BlockContainerIdGenerator(_) => "block_container_id_generator",
            Operation::BlockInfo(_) => "block_info",
            Operation::DeleteBlock(_) => "delete_block",
            Operation::InodeDirectory(_) => "inode_directory",
            Operation::InodeFile(_) => "inode_file",
            Operation::UpdateInode(_) => "update_inode",
            Operation::DeleteFile(_) => "delete_file",
            Operation::Rename(_) => "rename",
            Operation::AddMountPoint(_) => "add_mount_point",
            Operation::DeleteMountPoint(_) => "delete_mount_point",
            Operation::ClusterInfo(_) => "cluster_info",
            Operation::PathProperties(_) => "path_properties",
            Operation::RemovePathProperties(_) => "remove_path_properties",
            Operation::AddTable(_) => "add_table",
            Operation::Extension(_) => "extension",
        }
    }

    /// Shard that owns this operation, when the operation type has one.
    pub fn shard(&self) -> Option<Shard> {
        match self {
            Operation::BlockContainerIdGenerator(_)
            | Operation::BlockInfo(_)
            | Operation::DeleteBlock(_) => Some(Shard::BlockMaster),
            Operation::InodeDirectory(_)
            | Operation::InodeFile(_)
            | Operation::UpdateInode(_)
            | Operation::DeleteFile(_)
            | Operation::Rename(_)
            | Operation::AddMountPoint(_)
            | Operation::DeleteMountPoint(_) => Some(Shard::FileSystemMaster),
            Operation::ClusterInfo(_)
            | Operation::PathProperties(_)
            | Operation::RemovePathProperties(_) => Some(Shard::MetaMaster),
            Operation::AddTable(_) => Some(Shard::TableMaster),
            Operation::Extension(_) => None,
        }
    }

    /// Owner name used for shard filtering.
    ///
    /// Returns `None` when ownership cannot be resolved.
    pub fn owner(&self) -> Option<&'a str> {
        match self {
            Operation::Extension(ext) => ext.owner.as_deref(),
            other => other.shard().map(|shard| shard.name()),
        }
    }
}
