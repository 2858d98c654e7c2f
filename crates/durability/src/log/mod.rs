//! Consensus log segments.
//!
//! - [`segment`]: segment file naming, listing, and gap detection
//! - [`reader`]: streaming record reader over one segment

pub mod reader;
pub mod segment;

pub use reader::{RecordError, SegmentError, SegmentReader, SegmentScan};
pub use segment::{find_gaps, list_segments, LogSegmentDescriptor, SegmentGap, SegmentListError};
