//! Logical shards that own journal operations.
//!
//! Every concrete operation recorded in the journal belongs to exactly one
//! subsystem of the replicated store. The dump tool filters on that owner.

use std::fmt;
use std::str::FromStr;

/// Known owners of journal operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shard {
    /// File system namespace: inodes, renames, mount table
    FileSystemMaster,
    /// Block metadata and block id allocation
    BlockMaster,
    /// Cluster-wide metadata and path-level configuration
    MetaMaster,
    /// Table catalog
    TableMaster,
}

impl Shard {
    /// All known shards, in declaration order.
    pub const ALL: [Shard; 4] = [
        Shard::FileSystemMaster,
        Shard::BlockMaster,
        Shard::MetaMaster,
        Shard::TableMaster,
    ];

    /// Canonical shard name as it appears on the command line and in output.
    pub fn name(&self) -> &'static str {
        match self {
            Shard::FileSystemMaster => "FileSystemMaster",
            Shard::BlockMaster => "BlockMaster",
            Shard::MetaMaster => "MetaMaster",
            Shard::TableMaster => "TableMaster",
        }
    }

    /// Case-insensitive comparison against an arbitrary owner name.
    pub fn matches(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shard {
    type Err = UnknownShard;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shard::ALL
            .into_iter()
            .find(|shard| shard.matches(s))
            .ok_or_else(|| UnknownShard(s.to_string()))
    }
}

/// Shard name that is not one of [`Shard::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown shard: {0}")]
pub struct UnknownShard(pub String);
