//! Dump orchestration.
//!
//! A run moves through fixed phases:
//!
//! ```text
//! Init -> ValidateInput -> ReadSnapshot -> ReadLog -> Done
//!              |                |             |
//!              +----------------+-------------+----> Fatal
//! ```
//!
//! The snapshot is materialized before any log segment is opened. Segment
//! and record failures during `ReadLog` are recorded in the summary and the
//! run continues; a structurally corrupt entry ends it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use raftdump_core::JournalEntry;
use raftdump_durability::{
    find_gaps, latest_snapshot, list_segments, materialize, LogSegmentDescriptor, SegmentReader,
    StorageLayout,
};

use crate::config::DumpConfig;
use crate::error::{DumpError, DumpResult};
use crate::select::EntrySelector;
use crate::summary::{DumpSummary, RecordFailure, SnapshotSummary};

/// Phase of a dump run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpPhase {
    /// Not started
    Init,
    /// Checking configuration and input directory
    ValidateInput,
    /// Materializing the latest snapshot
    ReadSnapshot,
    /// Reading log segments and writing entries
    ReadLog,
    /// Completed (possibly with non-fatal failures)
    Done,
    /// Aborted
    Fatal,
}

/// Runs one dump.
#[derive(Debug)]
pub struct Dumper {
    config: DumpConfig,
    phase: DumpPhase,
}

impl Dumper {
    /// Create a dumper for `config`.
    pub fn new(config: DumpConfig) -> Self {
        Dumper {
            config,
            phase: DumpPhase::Init,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    /// Current phase
    pub fn phase(&self) -> DumpPhase {
        self.phase
    }

    /// Run the dump to completion.
    ///
    /// Returns the summary when the run completes, even if some segments or
    /// records could not be read; check [`DumpSummary::outcome`].
    pub fn run(&mut self) -> DumpResult<DumpSummary> {
        let result = self.run_phases();
        match &result {
            Ok(summary) => {
                self.enter(DumpPhase::Done);
                tracing::info!(
                    outcome = ?summary.outcome(),
                    entries_written = summary.entries_written,
                    segment_failures = summary.segment_failures.len(),
                    record_failures = summary.record_failures.len(),
                    "Dump complete"
                );
            }
            Err(err) => {
                self.enter(DumpPhase::Fatal);
                tracing::error!(error = %err, "Dump aborted");
            }
        }
        result
    }

    fn enter(&mut self, phase: DumpPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "Dump phase");
        self.phase = phase;
    }

    fn run_phases(&mut self) -> DumpResult<DumpSummary> {
        self.enter(DumpPhase::ValidateInput);
        self.config.validate()?;
        let layout = self.config.layout();
        layout.validate()?;

        let mut summary = DumpSummary::default();

        self.enter(DumpPhase::ReadSnapshot);
        summary.snapshot = self.read_snapshot(&layout)?;

        self.enter(DumpPhase::ReadLog);
        self.read_log(&layout, &mut summary)?;

        Ok(summary)
    }

    fn read_snapshot(&self, layout: &StorageLayout) -> DumpResult<Option<SnapshotSummary>> {
        let Some(snapshot) = latest_snapshot(&layout.state_machine_dir())? else {
            tracing::debug!(dir = %layout.state_machine_dir().display(), "No snapshot found");
            return Ok(None);
        };

        tracing::info!(
            snapshot = %snapshot.id,
            files = snapshot.files.len(),
            "Reading snapshot"
        );
        let materialized = materialize(&snapshot, &self.config.output_dir)?;
        let summary = SnapshotSummary::new(&snapshot, &materialized);
        if summary.unverified_files > 0 {
            tracing::warn!(
                snapshot = %snapshot.id,
                unverified = summary.unverified_files,
                "Snapshot files copied without a recorded digest"
            );
        }
        Ok(Some(summary))
    }

    fn read_log(&self, layout: &StorageLayout, summary: &mut DumpSummary) -> DumpResult<()> {
        let range = self.config.range()?;
        let mut selector = EntrySelector::new(range);
        let mut sink = EntrySink::create(self.config.entry_file_path())?;

        let log_dir = layout.log_dir();
        if !log_dir.exists() {
            tracing::warn!(dir = %log_dir.display(), "Log directory not found, no entries to read");
            summary.log_missing = true;
        } else {
            match list_segments(&log_dir) {
                Ok(segments) => {
                    summary.segments_listed = segments.len() as u64;
                    for gap in find_gaps(&segments) {
                        tracing::warn!(?gap, "Log segments are not contiguous");
                        summary.segment_gaps += 1;
                    }
                    for segment in &segments {
                        dump_segment(segment, &mut selector, &mut sink, summary)?;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to list log segments");
                    summary.segment_failed(&err.path, &err);
                }
            }
        }

        summary.selection = selector.counters().clone();
        summary.entries_written = sink.written;
        summary.entry_file = Some(sink.finish()?);
        Ok(())
    }
}

/// Buffered writer of rendered entries.
struct EntrySink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl EntrySink {
    fn create(path: PathBuf) -> DumpResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DumpError::output(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| DumpError::output(&path, e))?;
        Ok(EntrySink {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    fn write(&mut self, entry: &JournalEntry) -> DumpResult<()> {
        writeln!(self.writer, "{}", entry).map_err(|e| DumpError::output(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    fn finish(mut self) -> DumpResult<PathBuf> {
        self.writer
            .flush()
            .map_err(|e| DumpError::output(&self.path, e))?;
        Ok(self.path)
    }
}

/// Read one segment, writing its selected entries.
///
/// Only structural corruption is returned as an error; everything else is
/// recorded in `summary`.
fn dump_segment(
    segment: &LogSegmentDescriptor,
    selector: &mut EntrySelector,
    sink: &mut EntrySink,
    summary: &mut DumpSummary,
) -> DumpResult<()> {
    let mut reader = match SegmentReader::open(segment) {
        Ok(reader) => reader,
        Err(err) => {
            tracing::error!(segment = %segment, error = %err, "Failed to open log segment");
            summary.segment_failed(segment.path(), &err);
            return Ok(());
        }
    };

    let mut entries = 0u64;
    for item in reader.by_ref() {
        let record = match item {
            Ok(record) => record,
            Err(err) => {
                summary.record_failures.push(RecordFailure::from(&err));
                continue;
            }
        };
        let Some(payload) = record.payload() else {
            summary.records_skipped += 1;
            continue;
        };
        let entry = match JournalEntry::from_bytes(payload) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(
                    segment = %segment,
                    index = record.index,
                    error = %err,
                    "Skipping undecodable journal entry"
                );
                summary.payload_failed(segment, record.index, &err);
                continue;
            }
        };
        entries += 1;

        for selected in selector.select(&entry)? {
            sink.write(selected)?;
        }
    }

    let scan = reader.finish();
    summary.records_read += scan.records_read;
    summary.entries_decoded += entries;

    tracing::info!(
        segment = %segment,
        records = scan.records_read,
        corrupted = scan.records_corrupted,
        "Read {} entries from log {}",
        entries,
        segment
    );
    if let Some(expected) = segment.expected_records() {
        let encountered = scan.records_read + scan.records_corrupted;
        if encountered != expected {
            tracing::warn!(
                segment = %segment,
                "Expected {} records, but found {}",
                expected,
                encountered
            );
        }
    }

    match scan.error {
        Some(err) => {
            tracing::error!(segment = %segment, error = %err, "Log segment read incomplete");
            summary.segment_failed(segment.path(), &err);
        }
        None => summary.segments_read += 1,
    }
    Ok(())
}
