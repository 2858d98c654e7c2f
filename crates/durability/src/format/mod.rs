//! On-disk byte formats for log segments.
//!
//! Keeping the byte layout separate from segment discovery and iteration
//! keeps format evolution in one place.
//!
//! # Module Structure
//!
//! - `segment`: segment file header
//! - `record`: record frames and their contents

pub mod record;
pub mod segment;

pub use record::{
    read_frame, FrameReadError, RawLogRecord, RecordFrameError, RecordKind, MAX_FRAME_LEN,
    RECORD_BODY_PREFIX, RECORD_FORMAT_VERSION,
};
pub use segment::{
    SegmentHeader, SegmentHeaderError, SEGMENT_FORMAT_VERSION, SEGMENT_HEADER_SIZE, SEGMENT_MAGIC,
};
