//! Core types for raftdump
//!
//! This crate defines the application-level view of the replicated journal:
//! - JournalEntry: the decoded unit of replication, with its structural check
//! - Operation: the concrete operation payloads an entry can carry
//! - Shard: the logical owners operations are attributed to
//! - DumpRange: sequence range and shard filter criteria

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod operation;
pub mod range;
pub mod shard;

pub use entry::{
    EntryCodecError, EntryKind, JournalEntry, StructuralCorruption, AGGREGATE_FIELD,
    MAX_NESTING_DEPTH,
};
pub use operation::{
    AddMountPointEntry, AddTableEntry, BlockContainerIdGeneratorEntry, BlockInfoEntry,
    ClusterInfoEntry, DeleteBlockEntry, DeleteFileEntry, DeleteMountPointEntry, ExtensionEntry,
    InodeDirectoryEntry, InodeFileEntry, Operation, PathPropertiesEntry, RemovePathPropertiesEntry,
    RenameEntry, UpdateInodeEntry,
};
pub use range::{DumpRange, RangeError};
pub use shard::{Shard, UnknownShard};
