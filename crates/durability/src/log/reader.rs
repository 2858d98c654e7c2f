//! Streaming reader over one log segment.
//!
//! A [`SegmentReader`] validates the segment header on open and then yields
//! records lazily, one frame at a time. Iteration is single-pass: once the
//! reader returns `None` it is exhausted, and [`SegmentReader::finish`]
//! reports how the scan ended.
//!
//! Corruption handling:
//! - a frame with a bad checksum or unparseable body is yielded as a
//!   [`RecordError`] and the reader moves on to the next frame;
//! - a frame cut off by end-of-file ends the scan. On the open segment this
//!   is the expected torn tail of an in-flight write; on a closed segment it
//!   is reported as [`SegmentError::Truncated`];
//! - an implausible length prefix ends the scan with
//!   [`SegmentError::Corrupt`], since the next frame boundary is unknown.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::format::{
    read_frame, FrameReadError, RawLogRecord, RecordFrameError, SegmentHeader, SegmentHeaderError,
    SEGMENT_HEADER_SIZE,
};
use crate::log::segment::LogSegmentDescriptor;

/// Lazy iterator over the records of one segment.
pub struct SegmentReader {
    descriptor: LogSegmentDescriptor,
    reader: BufReader<File>,
    /// Byte offset of the next frame
    offset: u64,
    last_index: Option<u64>,
    records_read: u64,
    records_corrupted: u64,
    torn_tail: bool,
    error: Option<SegmentError>,
    done: bool,
}

impl SegmentReader {
    /// Open a segment and validate its header.
    pub fn open(descriptor: &LogSegmentDescriptor) -> Result<Self, SegmentError> {
        let path = descriptor.path().to_path_buf();
        let file = File::open(&path).map_err(|source| SegmentError::Io {
            path: path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let header = SegmentHeader::read_from(&mut reader).map_err(|source| {
            if source.kind() == std::io::ErrorKind::UnexpectedEof {
                SegmentError::Truncated {
                    path: path.clone(),
                    offset: 0,
                }
            } else {
                SegmentError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        header
            .validate()
            .map_err(|source| SegmentError::InvalidHeader {
                path: path.clone(),
                source,
            })?;
        if header.start_index != descriptor.start_index() {
            return Err(SegmentError::StartIndexMismatch {
                path,
                expected: descriptor.start_index(),
                actual: header.start_index,
            });
        }

        Ok(SegmentReader {
            descriptor: descriptor.clone(),
            reader,
            offset: SEGMENT_HEADER_SIZE as u64,
            last_index: None,
            records_read: 0,
            records_corrupted: 0,
            torn_tail: false,
            error: None,
            done: false,
        })
    }

    /// Segment being read
    pub fn descriptor(&self) -> &LogSegmentDescriptor {
        &self.descriptor
    }

    /// Consume the reader and report how the scan ended.
    pub fn finish(self) -> SegmentScan {
        SegmentScan {
            descriptor: self.descriptor,
            records_read: self.records_read,
            records_corrupted: self.records_corrupted,
            valid_end: self.offset,
            torn_tail: self.torn_tail,
            error: self.error,
        }
    }

    fn check_index(&mut self, record: &RawLogRecord) {
        let expected = match self.last_index {
            Some(last) => last.checked_add(1),
            None => Some(self.descriptor.start_index()),
        };
        if expected != Some(record.index) {
            tracing::warn!(
                segment = %self.descriptor,
                expected = ?expected,
                actual = record.index,
                "Non-contiguous log index"
            );
        }
        if !self.descriptor.covers(record.index) {
            tracing::warn!(
                segment = %self.descriptor,
                index = record.index,
                "Log index outside segment range"
            );
        }
        self.last_index = Some(record.index);
    }

    fn stop(&mut self, error: Option<SegmentError>) -> Option<Result<RawLogRecord, RecordError>> {
        self.done = true;
        self.error = error;
        None
    }
}

impl Iterator for SegmentReader {
    type Item = Result<RawLogRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.offset;
        let frame = match read_frame(&mut self.reader) {
            Ok(Some(frame)) => frame,
            Ok(None) => return self.stop(None),
            Err(FrameReadError::Truncated { needed, available }) => {
                if self.descriptor.is_open() {
                    tracing::warn!(
                        segment = %self.descriptor,
                        offset,
                        needed,
                        available,
                        "Ignoring partial record at end of open segment"
                    );
                    self.torn_tail = true;
                    return self.stop(None);
                }
                let path = self.descriptor.path().to_path_buf();
                return self.stop(Some(SegmentError::Truncated { path, offset }));
            }
            Err(FrameReadError::ImplausibleLength(length)) => {
                let path = self.descriptor.path().to_path_buf();
                return self.stop(Some(SegmentError::Corrupt {
                    path,
                    offset,
                    detail: format!("implausible frame length {}", length),
                }));
            }
            Err(FrameReadError::Io(source)) => {
                let path = self.descriptor.path().to_path_buf();
                return self.stop(Some(SegmentError::Io { path, source }));
            }
        };

        self.offset += 4 + frame.len() as u64;

        match RawLogRecord::from_frame_body(&frame) {
            Ok(record) => {
                self.check_index(&record);
                self.records_read += 1;
                Some(Ok(record))
            }
            Err(source) => {
                tracing::warn!(
                    segment = %self.descriptor,
                    offset,
                    error = %source,
                    "Skipping corrupted log record"
                );
                self.records_corrupted += 1;
                Some(Err(RecordError {
                    path: self.descriptor.path().to_path_buf(),
                    offset,
                    source,
                }))
            }
        }
    }
}

/// Outcome of scanning one segment to the end.
#[derive(Debug)]
pub struct SegmentScan {
    /// Segment that was scanned
    pub descriptor: LogSegmentDescriptor,
    /// Records decoded successfully
    pub records_read: u64,
    /// Frames skipped because they failed to decode
    pub records_corrupted: u64,
    /// Byte offset where well-formed frames end
    pub valid_end: u64,
    /// The open segment ended in a partial frame
    pub torn_tail: bool,
    /// Error that ended the scan early
    pub error: Option<SegmentError>,
}

impl SegmentScan {
    /// Records a closed segment should hold but did not yield.
    pub fn missing_records(&self) -> Option<u64> {
        self.descriptor
            .expected_records()
            .map(|expected| expected.saturating_sub(self.records_read + self.records_corrupted))
    }
}

/// A whole segment cannot be read (further).
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// I/O error opening or reading the segment
    #[error("I/O error reading segment {}: {source}", path.display())]
    Io {
        /// Segment path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Header is not a valid segment header
    #[error("Invalid header in segment {}: {source}", path.display())]
    InvalidHeader {
        /// Segment path
        path: PathBuf,
        /// Header problem
        #[source]
        source: SegmentHeaderError,
    },

    /// Header start index disagrees with the file name
    #[error(
        "Segment {} starts at index {actual}, file name says {expected}",
        path.display()
    )]
    StartIndexMismatch {
        /// Segment path
        path: PathBuf,
        /// Start index from the file name
        expected: u64,
        /// Start index from the header
        actual: u64,
    },

    /// Closed segment ends in the middle of a header or frame
    #[error("Segment {} truncated at offset {offset}", path.display())]
    Truncated {
        /// Segment path
        path: PathBuf,
        /// Offset of the incomplete header or frame
        offset: u64,
    },

    /// Frame boundary can no longer be determined
    #[error("Segment {} corrupt at offset {offset}: {detail}", path.display())]
    Corrupt {
        /// Segment path
        path: PathBuf,
        /// Offset of the bad frame
        offset: u64,
        /// Description
        detail: String,
    },
}

/// One frame could not be decoded.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Corrupted record in {} at offset {offset}: {source}", path.display())]
pub struct RecordError {
    /// Segment path
    pub path: PathBuf,
    /// Frame offset within the segment
    pub offset: u64,
    /// Decode failure
    #[source]
    pub source: RecordFrameError,
}
