//! raftdump - offline inspection of a consensus-replicated journal
//!
//! Reads log segments and the latest snapshot straight from a journal
//! directory, without contacting the cluster, and writes a filtered,
//! human-readable view of the recorded operations.
//!
//! # Quick Start
//!
//! ```ignore
//! use raftdump::{DumpConfig, Dumper};
//!
//! let config = DumpConfig::new("/journal", "/tmp/dump", "FileSystemMaster")
//!     .with_start(100)
//!     .with_end(200);
//! let summary = Dumper::new(config).run()?;
//! println!("{} entries written", summary.entries_written);
//! ```
//!
//! # Architecture
//!
//! - `raftdump-core`: journal entries, operations, shards, ranges
//! - `raftdump-durability`: segment and snapshot readers over the on-disk layout
//! - `raftdump-engine`: entry selection and the dump run itself

pub use raftdump_core::{DumpRange, EntryKind, JournalEntry, Operation, Shard, StructuralCorruption};
pub use raftdump_durability::{
    LogSegmentDescriptor, SegmentError, SnapshotDescriptor, SnapshotError, StorageLayout,
    DEFAULT_GROUP_ID,
};
pub use raftdump_engine::{
    ConfigError, DumpConfig, DumpError, DumpOutcome, DumpPhase, DumpResult, DumpSummary, Dumper,
    EntrySelector,
};
