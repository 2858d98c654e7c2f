//! Synthetic journal storage for tests.
//!
//! Writes segment files and snapshot directories in the exact on-disk format
//! the readers consume, so tests across the workspace can build a journal
//! without a running cluster.
//!
//! # Example
//!
//! ```ignore
//! use raftdump_durability::testing::JournalFixture;
//!
//! let fixture = JournalFixture::new(dir.path());
//! fixture.write_segment(1, &entries)?;
//! fixture.write_snapshot(1, 10, &[("inodes", b"data", true)])?;
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use raftdump_core::JournalEntry;
use uuid::Uuid;

use crate::format::{RawLogRecord, SegmentHeader};
use crate::layout::StorageLayout;
use crate::log::LogSegmentDescriptor;
use crate::snapshot::digest::{digest_hex, sidecar_contents, sidecar_path};
use crate::snapshot::SnapshotId;

/// Writes one log segment.
///
/// The file starts out as an open segment and is renamed to its closed name
/// by [`SegmentWriter::close`].
pub struct SegmentWriter {
    dir: PathBuf,
    start_index: u64,
    last_index: Option<u64>,
    writer: BufWriter<File>,
}

impl SegmentWriter {
    /// Create an open segment starting at `start_index` in `dir`.
    pub fn create(dir: &Path, start_index: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = LogSegmentDescriptor::open(dir, start_index).path().to_path_buf();
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&SegmentHeader::new(start_index).to_bytes())?;
        Ok(SegmentWriter {
            dir: dir.to_path_buf(),
            start_index,
            last_index: None,
            writer,
        })
    }

    /// Append one record frame.
    pub fn append(&mut self, record: &RawLogRecord) -> io::Result<()> {
        self.writer.write_all(&record.to_frame())?;
        self.last_index = Some(record.index);
        Ok(())
    }

    /// Append raw bytes, e.g. a deliberately broken frame.
    pub fn append_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    /// Flush and rename to `log_<start>-<last appended index>`.
    ///
    /// Fails if nothing was appended: a closed segment is never empty.
    pub fn close(mut self) -> io::Result<LogSegmentDescriptor> {
        let end_index = self.last_index.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "cannot close an empty segment")
        })?;
        self.writer.flush()?;
        let open = LogSegmentDescriptor::open(&self.dir, self.start_index);
        let closed = LogSegmentDescriptor::closed(&self.dir, self.start_index, end_index);
        fs::rename(open.path(), closed.path())?;
        Ok(closed)
    }

    /// Flush and leave the segment open.
    pub fn into_open(mut self) -> io::Result<LogSegmentDescriptor> {
        self.writer.flush()?;
        Ok(LogSegmentDescriptor::open(&self.dir, self.start_index))
    }
}

/// Journal storage directory under construction.
#[derive(Debug, Clone)]
pub struct JournalFixture {
    layout: StorageLayout,
}

impl JournalFixture {
    /// Fixture for the default group under `root`.
    pub fn new(root: &Path) -> Self {
        JournalFixture {
            layout: StorageLayout::new(root),
        }
    }

    /// Fixture for `group_id` under `root`.
    pub fn with_group(root: &Path, group_id: Uuid) -> Self {
        JournalFixture {
            layout: StorageLayout::with_group(root, group_id),
        }
    }

    /// Layout the fixture writes into
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Encode `entries` as term-1 state-machine records starting at `start_index`.
    pub fn records(start_index: u64, entries: &[JournalEntry]) -> io::Result<Vec<RawLogRecord>> {
        entries
            .iter()
            .zip(start_index..)
            .map(|(entry, index)| {
                let payload = entry
                    .to_bytes()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(RawLogRecord::state_machine(1, index, payload))
            })
            .collect()
    }

    /// Start a segment writer in the log directory.
    pub fn segment_writer(&self, start_index: u64) -> io::Result<SegmentWriter> {
        SegmentWriter::create(&self.layout.log_dir(), start_index)
    }

    /// Write a closed segment holding `entries`.
    pub fn write_segment(
        &self,
        start_index: u64,
        entries: &[JournalEntry],
    ) -> io::Result<LogSegmentDescriptor> {
        let mut writer = self.segment_writer(start_index)?;
        for record in Self::records(start_index, entries)? {
            writer.append(&record)?;
        }
        writer.close()
    }

    /// Write the open segment holding `entries`.
    pub fn write_open_segment(
        &self,
        start_index: u64,
        entries: &[JournalEntry],
    ) -> io::Result<LogSegmentDescriptor> {
        let mut writer = self.segment_writer(start_index)?;
        for record in Self::records(start_index, entries)? {
            writer.append(&record)?;
        }
        writer.into_open()
    }

    /// Write a snapshot directory.
    ///
    /// Each file is `(relative path, contents, write digest sidecar)`.
    pub fn write_snapshot(
        &self,
        term: u64,
        index: u64,
        files: &[(&str, &[u8], bool)],
    ) -> io::Result<PathBuf> {
        let dir = self
            .layout
            .state_machine_dir()
            .join(SnapshotId::new(term, index).dir_name());
        fs::create_dir_all(&dir)?;

        for (relative, contents, with_digest) in files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            if *with_digest {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                fs::write(
                    sidecar_path(&path),
                    sidecar_contents(&digest_hex(contents), &file_name),
                )?;
            }
        }
        Ok(dir)
    }
}
