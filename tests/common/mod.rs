//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

pub use raftdump::{DumpConfig, DumpOutcome, DumpSummary, Dumper, JournalEntry};
pub use raftdump_core::{BlockInfoEntry, ExtensionEntry, InodeFileEntry};
pub use raftdump_durability::testing::JournalFixture;
use tempfile::TempDir;

// ============================================================================
// Journal directories
// ============================================================================

/// Input and output directories for one dump run.
pub struct DumpDirs {
    pub input: TempDir,
    pub output: TempDir,
}

impl DumpDirs {
    pub fn new() -> Self {
        DumpDirs {
            input: TempDir::new().expect("input dir"),
            output: TempDir::new().expect("output dir"),
        }
    }

    pub fn fixture(&self) -> JournalFixture {
        JournalFixture::new(self.input.path())
    }

    pub fn config(&self, shard: &str) -> DumpConfig {
        DumpConfig::new(self.input.path(), self.output.path(), shard)
    }

    pub fn entry_file(&self) -> PathBuf {
        self.output.path().join("edits.txt")
    }

    /// Rendered entries written by the last run.
    pub fn written(&self) -> Vec<JournalEntryLine> {
        read_entry_lines(&self.entry_file())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Plugin operation owned by `owner`.
pub fn owned_by(seq: u64, owner: &str) -> JournalEntry {
    JournalEntry {
        sequence_number: seq,
        extension: Some(ExtensionEntry {
            kind: "test".to_string(),
            owner: Some(owner.to_string()),
            data: seq.to_le_bytes().to_vec(),
        }),
        ..Default::default()
    }
}

/// Block operation, owned by BlockMaster.
pub fn block(seq: u64) -> JournalEntry {
    JournalEntry {
        sequence_number: seq,
        block_info: Some(BlockInfoEntry {
            block_id: seq,
            length: 512,
        }),
        ..Default::default()
    }
}

/// One line of the entry file, parsed back from JSON.
#[derive(Debug, Clone)]
pub struct JournalEntryLine {
    pub sequence_number: u64,
    pub json: serde_json::Value,
}

pub fn read_entry_lines(path: &Path) -> Vec<JournalEntryLine> {
    fs::read_to_string(path)
        .expect("entry file")
        .lines()
        .map(|line| {
            let json: serde_json::Value = serde_json::from_str(line).expect("entry line is JSON");
            JournalEntryLine {
                sequence_number: json["sequence_number"].as_u64().expect("sequence number"),
                json,
            }
        })
        .collect()
}

pub fn sequences(lines: &[JournalEntryLine]) -> Vec<u64> {
    lines.iter().map(|l| l.sequence_number).collect()
}

/// Every file below `dir`, relative path to contents, sorted.
pub fn tree_contents(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).expect("under root").to_path_buf();
                out.push((relative, fs::read(&path).expect("read file")));
            }
        }
    }
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}
