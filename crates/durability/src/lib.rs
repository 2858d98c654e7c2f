//! Read-only access to consensus journal storage
//!
//! This crate handles everything that touches the source directory:
//!
//! - Layout: resolving the group, log and state machine directories
//! - Log: segment discovery and streaming record iteration
//! - Snapshot: latest snapshot discovery and verified reconstruction
//! - Binary on-disk formats (segment header, record frames)
//! - Test fixtures that write synthetic storage directories
//!
//! Nothing here writes to the source directory or takes its lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format; // Segment header and record frame layout
pub mod layout; // Group directory resolution
pub mod log; // Segment listing and reading
pub mod snapshot; // Snapshot discovery, digests, materialization
pub mod testing; // Synthetic storage for tests

// === Re-exports ===
pub use format::{
    RawLogRecord, RecordFrameError, RecordKind, SegmentHeader, SegmentHeaderError,
    SEGMENT_HEADER_SIZE, SEGMENT_MAGIC,
};
pub use layout::{StorageLayout, StorageLayoutError, DEFAULT_GROUP_ID};
pub use log::{
    find_gaps, list_segments, LogSegmentDescriptor, RecordError, SegmentError, SegmentGap,
    SegmentListError, SegmentReader, SegmentScan,
};
pub use snapshot::{
    latest_snapshot, materialize, CheckpointOutput, MaterializedSnapshot, SnapshotDescriptor,
    SnapshotError, SnapshotFileEntry, SnapshotId,
};
