//! Log record frame format.
//!
//! # Record Layout
//!
//! ```text
//! ┌─────────────────┬──────────────────────────────────────┬──────────┐
//! │ Length (4 bytes)│ Body (variable)                      │ CRC32 (4)│
//! └─────────────────┴──────────────────────────────────────┴──────────┘
//!
//! Body:
//! ┌────────────┬──────────┬───────────┬──────────┬───────────────────┐
//! │ Format (1) │ Term (8) │ Index (8) │ Kind (1) │ Data (variable)   │
//! └────────────┴──────────┴───────────┴──────────┴───────────────────┘
//! ```
//!
//! The length field counts body + CRC. The CRC covers the body only.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher;

/// Current record format version
pub const RECORD_FORMAT_VERSION: u8 = 1;

/// Body bytes before the data section: format(1) + term(8) + index(8) + kind(1)
pub const RECORD_BODY_PREFIX: usize = 18;

/// Upper bound on a plausible frame length.
///
/// A length prefix above this is treated as corruption, not as a record.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

const KIND_STATE_MACHINE: u8 = 0;
const KIND_CONFIGURATION: u8 = 1;
const KIND_METADATA: u8 = 2;

/// What a log record carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// Application payload (an encoded journal entry)
    StateMachine(Vec<u8>),
    /// Cluster membership change, opaque to this tool
    Configuration(Vec<u8>),
    /// Commit index bookkeeping
    Metadata {
        /// Commit index recorded by the leader
        commit_index: u64,
    },
}

/// One decoded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogRecord {
    /// Leader term the record was written in
    pub term: u64,
    /// Log index
    pub index: u64,
    /// Record contents
    pub kind: RecordKind,
}

impl RawLogRecord {
    /// Create a state-machine record carrying `payload`.
    pub fn state_machine(term: u64, index: u64, payload: Vec<u8>) -> Self {
        RawLogRecord {
            term,
            index,
            kind: RecordKind::StateMachine(payload),
        }
    }

    /// The application payload, if this is a state-machine record.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.kind {
            RecordKind::StateMachine(data) => Some(data),
            _ => None,
        }
    }

    /// Serialize as a complete frame: length + body + crc32.
    pub fn to_frame(&self) -> Vec<u8> {
        let (kind, data) = match &self.kind {
            RecordKind::StateMachine(data) => (KIND_STATE_MACHINE, data.clone()),
            RecordKind::Configuration(data) => (KIND_CONFIGURATION, data.clone()),
            RecordKind::Metadata { commit_index } => {
                (KIND_METADATA, commit_index.to_le_bytes().to_vec())
            }
        };

        let mut body = Vec::with_capacity(RECORD_BODY_PREFIX + data.len());
        body.push(RECORD_FORMAT_VERSION);
        body.extend_from_slice(&self.term.to_le_bytes());
        body.extend_from_slice(&self.index.to_le_bytes());
        body.push(kind);
        body.extend_from_slice(&data);

        let crc = compute_crc(&body);
        let total_len = body.len() + 4;

        let mut frame = Vec::with_capacity(4 + total_len);
        frame.extend_from_slice(&(total_len as u32).to_le_bytes());
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&crc.to_le_bytes());
        frame
    }

    /// Decode a record from the bytes following a frame's length prefix.
    pub fn from_frame_body(body_with_crc: &[u8]) -> Result<Self, RecordFrameError> {
        if body_with_crc.len() < RECORD_BODY_PREFIX + 4 {
            return Err(RecordFrameError::InvalidFormat(format!(
                "frame of {} bytes is shorter than the minimum {}",
                body_with_crc.len(),
                RECORD_BODY_PREFIX + 4
            )));
        }

        let split = body_with_crc.len() - 4;
        let body = &body_with_crc[..split];
        let stored_crc = LittleEndian::read_u32(&body_with_crc[split..]);
        let computed_crc = compute_crc(body);
        if stored_crc != computed_crc {
            return Err(RecordFrameError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let format_version = body[0];
        if format_version != RECORD_FORMAT_VERSION {
            return Err(RecordFrameError::UnsupportedVersion(format_version));
        }

        let term = LittleEndian::read_u64(&body[1..9]);
        let index = LittleEndian::read_u64(&body[9..17]);
        let data = &body[RECORD_BODY_PREFIX..];

        let kind = match body[17] {
            KIND_STATE_MACHINE => RecordKind::StateMachine(data.to_vec()),
            KIND_CONFIGURATION => RecordKind::Configuration(data.to_vec()),
            KIND_METADATA => {
                if data.len() != 8 {
                    return Err(RecordFrameError::InvalidFormat(format!(
                        "metadata record carries {} bytes, expected 8",
                        data.len()
                    )));
                }
                RecordKind::Metadata {
                    commit_index: LittleEndian::read_u64(data),
                }
            }
            other => return Err(RecordFrameError::UnknownKind(other)),
        };

        Ok(RawLogRecord { term, index, kind })
    }
}

/// Read the next frame from `reader`, returning its body + crc bytes.
///
/// Returns `Ok(None)` at a clean end of data (no bytes left).
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameReadError> {
    let mut len_bytes = [0u8; 4];
    let filled = read_until_eof(reader, &mut len_bytes)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < len_bytes.len() {
        return Err(FrameReadError::Truncated {
            needed: len_bytes.len(),
            available: filled,
        });
    }

    let length = LittleEndian::read_u32(&len_bytes) as usize;
    if length == 0 || length > MAX_FRAME_LEN {
        return Err(FrameReadError::ImplausibleLength(length));
    }

    let mut frame = vec![0u8; length];
    let filled = read_until_eof(reader, &mut frame)?;
    if filled < length {
        return Err(FrameReadError::Truncated {
            needed: length,
            available: filled,
        });
    }

    Ok(Some(frame))
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read.
fn read_until_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Errors decoding a complete frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFrameError {
    /// Record format is invalid
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    /// Checksum verification failed
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the frame
        expected: u32,
        /// Checksum computed over the body
        computed: u32,
    },

    /// Unsupported format version
    #[error("Unsupported record format version: {0}")]
    UnsupportedVersion(u8),

    /// Unknown record kind tag
    #[error("Unknown record kind: {0}")]
    UnknownKind(u8),
}

/// Errors locating the next frame in a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameReadError {
    /// Data ends before the frame does
    #[error("Frame truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the frame requires
        needed: usize,
        /// Bytes present before end of data
        available: usize,
    },

    /// Length prefix is zero or larger than any valid frame
    #[error("Implausible frame length: {0}")]
    ImplausibleLength(usize),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawLogRecord {
        RawLogRecord::state_machine(2, 17, vec![1, 2, 3, 4])
    }

    fn body(frame: &[u8]) -> &[u8] {
        &frame[4..]
    }

    #[test]
    fn test_frame_roundtrip_all_kinds() {
        let records = [
            sample(),
            RawLogRecord {
                term: 1,
                index: 2,
                kind: RecordKind::Configuration(b"peers".to_vec()),
            },
            RawLogRecord {
                term: 1,
                index: 3,
                kind: RecordKind::Metadata { commit_index: 99 },
            },
        ];

        for record in records {
            let frame = record.to_frame();
            assert_eq!(RawLogRecord::from_frame_body(body(&frame)).unwrap(), record);
        }
    }

    #[test]
    fn test_payload_only_for_state_machine() {
        assert_eq!(sample().payload(), Some(&[1u8, 2, 3, 4][..]));
        let meta = RawLogRecord {
            term: 1,
            index: 1,
            kind: RecordKind::Metadata { commit_index: 0 },
        };
        assert_eq!(meta.payload(), None);
    }

    #[test]
    fn test_checksum_failure() {
        let mut frame = sample().to_frame();
        frame[10] ^= 0xFF;

        assert!(matches!(
            RawLogRecord::from_frame_body(body(&frame)),
            Err(RecordFrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_read_frame_sequence_and_eof() {
        let mut stream = sample().to_frame();
        stream.extend(sample().to_frame());
        let mut reader = &stream[..];

        assert!(read_frame(&mut reader).unwrap().is_some());
        assert!(read_frame(&mut reader).unwrap().is_some());
        assert!(read_frame(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_read_frame_truncated_body() {
        let frame = sample().to_frame();
        let mut reader = &frame[..frame.len() - 3];

        assert!(matches!(
            read_frame(&mut reader),
            Err(FrameReadError::Truncated { .. })
        ));
    }

    #[test]
    fn test_read_frame_truncated_length() {
        let mut reader = &[7u8, 0][..];
        assert!(matches!(
            read_frame(&mut reader),
            Err(FrameReadError::Truncated {
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_read_frame_zero_length() {
        let mut reader = &[0u8, 0, 0, 0, 1][..];
        assert!(matches!(
            read_frame(&mut reader),
            Err(FrameReadError::ImplausibleLength(0))
        ));
    }
}
