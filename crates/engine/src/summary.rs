//! Dump result reporting.
//!
//! A [`DumpSummary`] is returned by every run that did not fail fatally. It
//! carries the counts and the non-fatal failures so the caller decides how to
//! report them.

use std::path::{Path, PathBuf};

use raftdump_durability::{LogSegmentDescriptor, MaterializedSnapshot, RecordError, SnapshotDescriptor};
use serde::Serialize;

use crate::select::SelectionCounters;

/// Terminal status of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpOutcome {
    /// Every segment and record was read
    Success,
    /// Completed, but some segments or records could not be read
    Partial,
}

/// Snapshot that was materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    /// Snapshot term
    pub term: u64,
    /// Snapshot index
    pub index: u64,
    /// Checkpoint directory written
    pub checkpoint_dir: PathBuf,
    /// Files written
    pub files: usize,
    /// Files written without a recorded digest
    pub unverified_files: usize,
    /// Bytes written
    pub bytes: u64,
}

impl SnapshotSummary {
    pub(crate) fn new(descriptor: &SnapshotDescriptor, materialized: &MaterializedSnapshot) -> Self {
        SnapshotSummary {
            term: descriptor.id.term,
            index: descriptor.id.index,
            checkpoint_dir: materialized.dir.clone(),
            files: materialized.files.len(),
            unverified_files: materialized.unverified().count(),
            bytes: materialized.total_bytes(),
        }
    }
}

/// A segment that could not be read, or not read to the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentFailure {
    /// Segment file (or log directory, for listing failures)
    pub path: PathBuf,
    /// Error description
    pub reason: String,
}

/// A record that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Segment containing the record
    pub segment: PathBuf,
    /// Frame offset, when the frame itself was bad
    pub offset: Option<u64>,
    /// Log index, when the frame decoded but the payload did not
    pub index: Option<u64>,
    /// Error description
    pub reason: String,
}

impl From<&RecordError> for RecordFailure {
    fn from(err: &RecordError) -> Self {
        RecordFailure {
            segment: err.path.clone(),
            offset: Some(err.offset),
            index: None,
            reason: err.source.to_string(),
        }
    }
}

/// Counts and non-fatal failures of one dump run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DumpSummary {
    /// Materialized snapshot, if one was present
    pub snapshot: Option<SnapshotSummary>,
    /// Rendered entry file
    pub entry_file: Option<PathBuf>,
    /// The log directory did not exist
    pub log_missing: bool,
    /// Segments listed
    pub segments_listed: u64,
    /// Discontinuities between consecutive segments
    pub segment_gaps: u64,
    /// Segments read to the end
    pub segments_read: u64,
    /// Log records decoded from frames
    pub records_read: u64,
    /// Records without an application payload
    pub records_skipped: u64,
    /// Journal entries decoded from payloads
    pub entries_decoded: u64,
    /// Entries written to the entry file
    pub entries_written: u64,
    /// Selector counters
    pub selection: SelectionCounters,
    /// Segments that failed
    pub segment_failures: Vec<SegmentFailure>,
    /// Records that failed
    pub record_failures: Vec<RecordFailure>,
}

impl DumpSummary {
    /// Terminal status of the run.
    pub fn outcome(&self) -> DumpOutcome {
        if self.segment_failures.is_empty() && self.record_failures.is_empty() {
            DumpOutcome::Success
        } else {
            DumpOutcome::Partial
        }
    }

    pub(crate) fn segment_failed(&mut self, path: &Path, reason: impl ToString) {
        self.segment_failures.push(SegmentFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    pub(crate) fn payload_failed(
        &mut self,
        segment: &LogSegmentDescriptor,
        index: u64,
        reason: impl ToString,
    ) {
        self.record_failures.push(RecordFailure {
            segment: segment.path().to_path_buf(),
            offset: None,
            index: Some(index),
            reason: reason.to_string(),
        });
    }
}
