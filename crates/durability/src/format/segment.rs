//! Log segment file header.
//!
//! # Segment Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Segment Header (16 bytes)          │
//! ├────────────────────────────────────┤
//! │ Record 1                           │
//! ├────────────────────────────────────┤
//! │ Record 2                           │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```
//!
//! # Header Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬───────────────────┐
//! │ Magic (4)    │ Format Ver (4)   │ Start Index (8)   │
//! └──────────────┴──────────────────┴───────────────────┘
//! ```

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};

/// Magic bytes identifying a log segment file: "RLOG"
pub const SEGMENT_MAGIC: [u8; 4] = *b"RLOG";

/// Current segment format version
pub const SEGMENT_FORMAT_VERSION: u32 = 1;

/// Size of segment header in bytes
pub const SEGMENT_HEADER_SIZE: usize = 16;

/// Log segment header (16 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Magic bytes: "RLOG"
    pub magic: [u8; 4],

    /// Format version for forward compatibility
    pub format_version: u32,

    /// Log index of the first record in the segment
    pub start_index: u64,
}

impl SegmentHeader {
    /// Create a new segment header.
    pub fn new(start_index: u64) -> Self {
        SegmentHeader {
            magic: SEGMENT_MAGIC,
            format_version: SEGMENT_FORMAT_VERSION,
            start_index,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; SEGMENT_HEADER_SIZE] {
        let mut bytes = [0u8; SEGMENT_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.start_index.to_le_bytes());
        bytes
    }

    /// Read a header from the start of a segment.
    ///
    /// Fails with `UnexpectedEof` if the file is shorter than a header.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        let format_version = reader.read_u32::<LittleEndian>()?;
        let start_index = reader.read_u64::<LittleEndian>()?;
        Ok(SegmentHeader {
            magic,
            format_version,
            start_index,
        })
    }

    /// Check magic and format version.
    pub fn validate(&self) -> Result<(), SegmentHeaderError> {
        if self.magic != SEGMENT_MAGIC {
            return Err(SegmentHeaderError::InvalidMagic(self.magic));
        }
        if self.format_version != SEGMENT_FORMAT_VERSION {
            return Err(SegmentHeaderError::UnsupportedVersion(self.format_version));
        }
        Ok(())
    }
}

/// Segment header validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentHeaderError {
    /// Magic bytes do not identify a log segment
    #[error("Invalid segment magic bytes: {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported format version
    #[error("Unsupported segment format version: {0}")]
    UnsupportedVersion(u32),
}
