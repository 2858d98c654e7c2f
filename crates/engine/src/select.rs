//! Entry selection.
//!
//! Flattens aggregate entries, drops placeholders, and keeps the concrete
//! operations that fall inside a [`DumpRange`]. Selection preserves encounter
//! order; nothing is re-sorted.

use raftdump_core::{DumpRange, EntryKind, JournalEntry, StructuralCorruption};
use serde::Serialize;

/// What the selector did with the entries it saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionCounters {
    /// Concrete operations emitted
    pub selected: u64,
    /// Aggregates flattened (at any depth)
    pub aggregates: u64,
    /// Empty placeholder entries dropped
    pub placeholders: u64,
    /// Operations outside the sequence range
    pub out_of_range: u64,
    /// Operations owned by another shard
    pub owner_mismatch: u64,
    /// Operations whose owner could not be determined
    pub owner_unknown: u64,
}

/// Applies a [`DumpRange`] to decoded entries.
#[derive(Debug)]
pub struct EntrySelector {
    range: DumpRange,
    counters: SelectionCounters,
}

impl EntrySelector {
    /// Create a selector for `range`.
    pub fn new(range: DumpRange) -> Self {
        EntrySelector {
            range,
            counters: SelectionCounters::default(),
        }
    }

    /// Filter criteria
    pub fn range(&self) -> &DumpRange {
        &self.range
    }

    /// Counters accumulated so far
    pub fn counters(&self) -> &SelectionCounters {
        &self.counters
    }

    /// Select the concrete operations in `entry`, flattening nested batches
    /// depth-first.
    ///
    /// Fails on the first entry (at any depth) that sets more than one field.
    pub fn select<'e>(
        &mut self,
        entry: &'e JournalEntry,
    ) -> Result<Vec<&'e JournalEntry>, StructuralCorruption> {
        let mut selected = Vec::new();
        self.collect(entry, &mut selected)?;
        Ok(selected)
    }

    fn collect<'e>(
        &mut self,
        entry: &'e JournalEntry,
        out: &mut Vec<&'e JournalEntry>,
    ) -> Result<(), StructuralCorruption> {
        match entry.kind()? {
            EntryKind::Aggregate(children) => {
                self.counters.aggregates += 1;
                for child in children {
                    self.collect(child, out)?;
                }
            }
            EntryKind::Placeholder => {
                self.counters.placeholders += 1;
            }
            EntryKind::Operation(operation) => {
                if !self.range.contains(entry.sequence_number) {
                    self.counters.out_of_range += 1;
                    return Ok(());
                }
                match operation.owner() {
                    Some(owner) if self.range.is_owned_by(owner) => {
                        self.counters.selected += 1;
                        out.push(entry);
                    }
                    Some(_) => self.counters.owner_mismatch += 1,
                    None => {
                        self.counters.owner_unknown += 1;
                        tracing::debug!(
                            sequence_number = entry.sequence_number,
                            operation = operation.name(),
                            "Owner unknown, entry not selected"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
