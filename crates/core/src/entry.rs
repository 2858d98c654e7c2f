//! Journal entries: the application-level unit of replication.
//!
//! A [`JournalEntry`] is stored as a flat record with one optional field per
//! operation type plus a list of nested entries. A well-formed entry populates
//! at most one of those, so every entry falls into exactly one [`EntryKind`]:
//!
//! - `Operation`: a single concrete operation
//! - `Aggregate`: a batch of nested entries, itself never selected
//! - `Placeholder`: nothing besides the sequence number, written around
//!   snapshot boundaries
//!
//! Entries are encoded as MessagePack maps with absent fields omitted, so
//! readers tolerate fields added or dropped by other writer versions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::operation::{
    AddMountPointEntry, AddTableEntry, BlockContainerIdGeneratorEntry, BlockInfoEntry,
    ClusterInfoEntry, DeleteBlockEntry, DeleteFileEntry, DeleteMountPointEntry, ExtensionEntry,
    InodeDirectoryEntry, InodeFileEntry, Operation, PathPropertiesEntry, RemovePathPropertiesEntry,
    RenameEntry, UpdateInodeEntry,
};

/// Field name used for the nested entry list.
pub const AGGREGATE_FIELD: &str = "journal_entries";

/// Deepest aggregate nesting accepted when decoding.
pub const MAX_NESTING_DEPTH: usize = 32;

// Each aggregate level is two MessagePack containers (entry map and list),
// plus the leaf operation map and its byte array.
const MAX_ENCODED_DEPTH: usize = 2 * MAX_NESTING_DEPTH + 4;

/// One decoded journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalEntry {
    /// Monotonically increasing sequence number
    pub sequence_number: u64,
    /// Client operation id, used for idempotence by the writer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<Uuid>,

    // ------------------------------------------------------------------
    // Block operations
    // ------------------------------------------------------------------
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_container_id_generator: Option<BlockContainerIdGeneratorEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_info: Option<BlockInfoEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_block: Option<DeleteBlockEntry>,

    // ------------------------------------------------------------------
    // File system operations
    // ------------------------------------------------------------------
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode_directory: Option<InodeDirectoryEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode_file: Option<InodeFileEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_inode: Option<UpdateInodeEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_file: Option<DeleteFileEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_mount_point: Option<AddMountPointEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_mount_point: Option<DeleteMountPointEntry>,

    // ------------------------------------------------------------------
    // Meta operations
    // ------------------------------------------------------------------
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfoEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_properties: Option<PathPropertiesEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_path_properties: Option<RemovePathPropertiesEntry>,

    // ------------------------------------------------------------------
    // Table and plugin operations
    // ------------------------------------------------------------------
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_table: Option<AddTableEntry>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionEntry>,

    /// Nested entries of an aggregate (batch) entry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub journal_entries: Vec<JournalEntry>,
}

/// Classification of a structurally valid entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind<'a> {
    /// A single concrete operation
    Operation(Operation<'a>),
    /// A batch of nested entries
    Aggregate(&'a [JournalEntry]),
    /// No operation and no nested entries
    Placeholder,
}

impl JournalEntry {
    /// Create an empty entry with the given sequence number.
    pub fn new(sequence_number: u64) -> Self {
        JournalEntry {
            sequence_number,
            ..Default::default()
        }
    }

    /// Create an aggregate entry wrapping `entries`.
    pub fn aggregate(sequence_number: u64, entries: Vec<JournalEntry>) -> Self {
        JournalEntry {
            sequence_number,
            journal_entries: entries,
            ..Default::default()
        }
    }

    /// Decode an entry from its MessagePack payload.
    ///
    /// Payloads nesting aggregates deeper than [`MAX_NESTING_DEPTH`] are
    /// rejected before any recursive processing.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EntryCodecError> {
        let mut de = rmp_serde::Deserializer::from_read_ref(bytes);
        de.set_max_depth(MAX_ENCODED_DEPTH);
        let entry = JournalEntry::deserialize(&mut de)
            .map_err(|e| EntryCodecError::Decode(e.to_string()))?;

        let depth = entry.nesting_depth();
        if depth > MAX_NESTING_DEPTH {
            return Err(EntryCodecError::TooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(entry)
    }

    /// Levels of aggregates below this entry; 0 when it has no children.
    pub fn nesting_depth(&self) -> usize {
        self.journal_entries
            .iter()
            .map(|child| child.nesting_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Encode the entry as a MessagePack payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EntryCodecError> {
        rmp_serde::to_vec_named(self).map_err(|e| EntryCodecError::Encode(e.to_string()))
    }

    /// Iterate over the populated operation fields, in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = Operation<'_>> {
        [
            self.block_container_id_generator
                .as_ref()
                .map(Operation::BlockContainerIdGenerator),
            self.block_info.as_ref().map(Operation::BlockInfo),
            self.delete_block.as_ref().map(Operation::DeleteBlock),
            self.inode_directory.as_ref().map(Operation::InodeDirectory),
            self.inode_file.as_ref().map(Operation::InodeFile),
            self.update_inode.as_ref().map(Operation::UpdateInode),
            self.delete_file.as_ref().map(Operation::DeleteFile),
            self.rename.as_ref().map(Operation::Rename),
            self.add_mount_point.as_ref().map(Operation::AddMountPoint),
            self.delete_mount_point.as_ref().map(Operation::DeleteMountPoint),
            self.cluster_info.as_ref().map(Operation::ClusterInfo),
            self.path_properties.as_ref().map(Operation::PathProperties),
            self.remove_path_properties
                .as_ref()
                .map(Operation::RemovePathProperties),
            self.add_table.as_ref().map(Operation::AddTable),
            self.extension.as_ref().map(Operation::Extension),
        ]
        .into_iter()
        .flatten()
    }

    /// Names of every populated field besides sequence number and operation id.
    pub fn populated_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self.operations().map(|op| op.name()).collect();
        if !self.journal_entries.is_empty() {
            fields.push(AGGREGATE_FIELD);
        }
        fields
    }

    /// Classify the entry, checking that at most one field is populated.
    pub fn kind(&self) -> Result<EntryKind<'_>, StructuralCorruption> {
        let mut operations = self.operations();
        let first = operations.next();
        let extra = operations.count();
        let has_batch = !self.journal_entries.is_empty();

        if extra > 0 || (first.is_some() && has_batch) {
            return Err(StructuralCorruption {
                sequence_number: self.sequence_number,
                fields: self.populated_fields(),
                entry: self.to_string(),
            });
        }

        Ok(match first {
            Some(op) => EntryKind::Operation(op),
            None if has_batch => EntryKind::Aggregate(&self.journal_entries),
            None => EntryKind::Placeholder,
        })
    }
}

/// Renders the entry as a single line of JSON with absent fields omitted.
impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&line)
    }
}

/// Entry payload encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryCodecError {
    /// Payload is not a well-formed entry
    #[error("Failed to decode journal entry: {0}")]
    Decode(String),

    /// Entry could not be encoded
    #[error("Failed to encode journal entry: {0}")]
    Encode(String),

    /// Aggregates nested deeper than allowed
    #[error("Journal entry nests {depth} aggregate levels, at most {max} are allowed")]
    TooDeep {
        /// Nesting found
        depth: usize,
        /// Limit
        max: usize,
    },
}

/// An entry populates more than one semantic field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Journal entries should never set multiple fields in addition to sequence number, \
     but entry {sequence_number} sets {fields:?}: {entry}"
)]
pub struct StructuralCorruption {
    /// Sequence number of the offending entry
    pub sequence_number: u64,
    /// Populated field names
    pub fields: Vec<&'static str>,
    /// Rendered offending entry
    pub entry: String,
}
