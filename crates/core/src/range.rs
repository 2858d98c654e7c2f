//! Dump filter criteria.

/// Sequence range and owning shard an entry must match to be dumped.
///
/// The range is half-open: `start <= sequence_number < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRange {
    start: u64,
    end: u64,
    shard: String,
}

impl DumpRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(shard: impl Into<String>, start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(DumpRange {
            start,
            end,
            shard: shard.into(),
        })
    }

    /// Range covering every sequence number.
    pub fn unbounded(shard: impl Into<String>) -> Self {
        DumpRange {
            start: 0,
            end: u64::MAX,
            shard: shard.into(),
        }
    }

    /// Inclusive start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Target shard name.
    pub fn shard(&self) -> &str {
        &self.shard
    }

    /// Whether `sequence_number` falls inside the range.
    pub fn contains(&self, sequence_number: u64) -> bool {
        sequence_number >= self.start && sequence_number < self.end
    }

    /// Whether `owner` is the target shard (case-insensitive).
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.shard.eq_ignore_ascii_case(owner)
    }
}

/// Invalid range bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start sequence is after end sequence
    #[error("Start sequence {start} is after end sequence {end}")]
    StartAfterEnd {
        /// Inclusive start
        start: u64,
        /// Exclusive end
        end: u64,
    },
}
