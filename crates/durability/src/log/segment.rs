//! Log segment discovery.
//!
//! Closed segments are named `log_<start>-<end>` (inclusive range). The
//! segment currently being written is `log_inprogress_<start>`. Any other file
//! in the log directory (metadata, lock files) is ignored.

use std::fmt;
use std::path::{Path, PathBuf};

const CLOSED_PREFIX: &str = "log_";
const OPEN_PREFIX: &str = "log_inprogress_";

/// One on-disk log segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSegmentDescriptor {
    path: PathBuf,
    start_index: u64,
    end_index: Option<u64>,
}

impl LogSegmentDescriptor {
    /// Describe a closed segment covering `start..=end`.
    pub fn closed(dir: &Path, start_index: u64, end_index: u64) -> Self {
        LogSegmentDescriptor {
            path: dir.join(Self::closed_file_name(start_index, end_index)),
            start_index,
            end_index: Some(end_index),
        }
    }

    /// Describe the open segment starting at `start_index`.
    pub fn open(dir: &Path, start_index: u64) -> Self {
        LogSegmentDescriptor {
            path: dir.join(Self::open_file_name(start_index)),
            start_index,
            end_index: None,
        }
    }

    /// File name of a closed segment.
    pub fn closed_file_name(start_index: u64, end_index: u64) -> String {
        format!("{}{}-{}", CLOSED_PREFIX, start_index, end_index)
    }

    /// File name of an open segment.
    pub fn open_file_name(start_index: u64) -> String {
        format!("{}{}", OPEN_PREFIX, start_index)
    }

    /// Parse a segment file name into `(start, end)`.
    ///
    /// Returns `None` for names that are not segment files, including closed
    /// names whose end precedes their start or whose end is `u64::MAX`.
    pub fn parse_file_name(name: &str) -> Option<(u64, Option<u64>)> {
        if let Some(start) = name.strip_prefix(OPEN_PREFIX) {
            return parse_index(start).map(|start| (start, None));
        }

        let range = name.strip_prefix(CLOSED_PREFIX)?;
        let (start, end) = range.split_once('-')?;
        let (start, end) = (parse_index(start)?, parse_index(end)?);
        if end < start || end == u64::MAX {
            return None;
        }
        Some((start, Some(end)))
    }

    /// Segment file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First log index in the segment
    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    /// Last log index for a closed segment
    pub fn end_index(&self) -> Option<u64> {
        self.end_index
    }

    /// Whether this is the segment currently being written
    pub fn is_open(&self) -> bool {
        self.end_index.is_none()
    }

    /// Number of records a closed segment should contain.
    pub fn expected_records(&self) -> Option<u64> {
        let end = self.end_index?;
        end.checked_sub(self.start_index)?.checked_add(1)
    }

    /// Whether `index` lies inside this segment's range.
    pub fn covers(&self, index: u64) -> bool {
        index >= self.start_index && self.end_index.map_or(true, |end| index <= end)
    }
}

impl fmt::Display for LogSegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn parse_index(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// List the segments in `log_dir`, ordered by start index.
pub fn list_segments(log_dir: &Path) -> Result<Vec<LogSegmentDescriptor>, SegmentListError> {
    let entries = std::fs::read_dir(log_dir).map_err(|source| SegmentListError {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let mut segments = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SegmentListError {
            path: log_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().to_string();

        if let Some((start_index, end_index)) = LogSegmentDescriptor::parse_file_name(&name) {
            segments.push(LogSegmentDescriptor {
                path: entry.path(),
                start_index,
                end_index,
            });
        }
    }

    // Open segment sorts after a closed one with the same start.
    segments.sort_by_key(|s| (s.start_index, s.is_open()));
    Ok(segments)
}

/// A discontinuity between two consecutive segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentGap {
    /// Indices between the two segments are missing
    Missing {
        /// First missing index
        expected_start: u64,
        /// Start of the following segment
        actual_start: u64,
    },
    /// The following segment starts inside the previous one
    Overlap {
        /// Index the following segment should start at
        expected_start: u64,
        /// Start of the following segment
        actual_start: u64,
    },
    /// A segment follows the open segment
    AfterOpen {
        /// Start of the following segment
        actual_start: u64,
    },
}

/// Check that consecutive segments are contiguous and non-overlapping.
pub fn find_gaps(segments: &[LogSegmentDescriptor]) -> Vec<SegmentGap> {
    segments
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(end) = prev.end_index else {
                return Some(SegmentGap::AfterOpen {
                    actual_start: next.start_index,
                });
            };
            let expected_start = end.saturating_add(1);
            if next.start_index > expected_start {
                Some(SegmentGap::Missing {
                    expected_start,
                    actual_start: next.start_index,
                })
            } else if next.start_index < expected_start {
                Some(SegmentGap::Overlap {
                    expected_start,
                    actual_start: next.start_index,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Failure reading the log directory listing.
#[derive(Debug, thiserror::Error)]
#[error("Failed to list log segments in {}: {source}", path.display())]
pub struct SegmentListError {
    /// Directory being listed
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_file_names() {
        assert_eq!(
            LogSegmentDescriptor::parse_file_name("log_0-99"),
            Some((0, Some(99)))
        );
        assert_eq!(
            LogSegmentDescriptor::parse_file_name("log_inprogress_100"),
            Some((100, None))
        );
        assert_eq!(LogSegmentDescriptor::parse_file_name("log_9-3"), None);
        assert_eq!(LogSegmentDescriptor::parse_file_name("log_a-3"), None);
        assert_eq!(LogSegmentDescriptor::parse_file_name("log_+1-3"), None);
        assert_eq!(LogSegmentDescriptor::parse_file_name("raft-meta"), None);
        assert_eq!(LogSegmentDescriptor::parse_file_name("in_use.lock"), None);
    }

    #[test]
    fn test_max_end_index_is_not_a_segment() {
        let name = LogSegmentDescriptor::closed_file_name(0, u64::MAX);
        assert_eq!(LogSegmentDescriptor::parse_file_name(&name), None);
        assert_eq!(
            LogSegmentDescriptor::parse_file_name(&format!("log_0-{}", u64::MAX - 1)),
            Some((0, Some(u64::MAX - 1)))
        );

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(&name), b"").unwrap();
        assert!(list_segments(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_index_arithmetic_at_u64_max() {
        let dir = Path::new("/log");
        let full = LogSegmentDescriptor::closed(dir, 0, u64::MAX);
        assert_eq!(full.expected_records(), None);
        assert_eq!(
            LogSegmentDescriptor::closed(dir, 1, u64::MAX).expected_records(),
            Some(u64::MAX)
        );

        let segments = vec![full, LogSegmentDescriptor::closed(dir, 5, 9)];
        assert_eq!(
            find_gaps(&segments),
            vec![SegmentGap::Overlap {
                expected_start: u64::MAX,
                actual_start: 5
            }]
        );
    }

    #[test]
    fn test_file_names_roundtrip() {
        let name = LogSegmentDescriptor::closed_file_name(5, 9);
        assert_eq!(name, "log_5-9");
        assert_eq!(
            LogSegmentDescriptor::parse_file_name(&name),
            Some((5, Some(9)))
        );
        assert_eq!(LogSegmentDescriptor::open_file_name(10), "log_inprogress_10");
    }

    #[test]
    fn test_expected_records_and_covers() {
        let dir = Path::new("/log");
        let closed = LogSegmentDescriptor::closed(dir, 10, 14);
        assert_eq!(closed.expected_records(), Some(5));
        assert!(closed.covers(10) && closed.covers(14));
        assert!(!closed.covers(15));

        let open = LogSegmentDescriptor::open(dir, 15);
        assert!(open.is_open());
        assert_eq!(open.expected_records(), None);
        assert!(open.covers(1_000));
    }

    #[test]
    fn test_list_segments_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in [
            "log_inprogress_20",
            "log_10-19",
            "log_0-9",
            "raft-meta",
            "in_use.lock",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let segments = list_segments(dir.path()).unwrap();
        let starts: Vec<_> = segments.iter().map(|s| s.start_index()).collect();
        assert_eq!(starts, vec![0, 10, 20]);
        assert!(segments[2].is_open());
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(list_segments(&dir.path().join("current")).is_err());
    }

    #[test]
    fn test_find_gaps() {
        let dir = Path::new("/log");
        let contiguous = vec![
            LogSegmentDescriptor::closed(dir, 0, 9),
            LogSegmentDescriptor::closed(dir, 10, 19),
            LogSegmentDescriptor::open(dir, 20),
        ];
        assert!(find_gaps(&contiguous).is_empty());

        let broken = vec![
            LogSegmentDescriptor::closed(dir, 0, 9),
            LogSegmentDescriptor::closed(dir, 12, 19),
            LogSegmentDescriptor::closed(dir, 15, 30),
        ];
        assert_eq!(
            find_gaps(&broken),
            vec![
                SegmentGap::Missing {
                    expected_start: 10,
                    actual_start: 12
                },
                SegmentGap::Overlap {
                    expected_start: 20,
                    actual_start: 15
                },
            ]
        );
    }
}
