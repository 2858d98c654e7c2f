//! Dump engine for raftdump
//!
//! This crate sequences a dump run over the lower layers:
//! - Config: input and output locations, range and shard filter
//! - Selection: flattening batches and filtering entries
//! - Dump: snapshot materialization followed by the log pass
//! - Summary: counts and non-fatal failures returned to the caller
//!
//! The engine never writes to the input directory.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dump;
pub mod error;
pub mod select;
pub mod summary;

pub use config::{ConfigError, DumpConfig, DEFAULT_ENTRY_FILE_NAME};
pub use dump::{DumpPhase, Dumper};
pub use error::{DumpError, DumpResult};
pub use select::{EntrySelector, SelectionCounters};
pub use summary::{DumpOutcome, DumpSummary, RecordFailure, SegmentFailure, SnapshotSummary};
