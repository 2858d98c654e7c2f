//! Damaged segments degrade the run to a partial result.

use std::fs::{self, OpenOptions};

use crate::common::*;

#[test]
fn truncated_closed_segment_is_partial() {
    let dirs = DumpDirs::new();
    let entries: Vec<_> = (0..5).map(block).collect();
    let segment = dirs.fixture().write_segment(0, &entries).unwrap();

    // Cut the last frame in half.
    let len = fs::metadata(segment.path()).unwrap().len();
    let file = OpenOptions::new().write(true).open(segment.path()).unwrap();
    file.set_len(len - 10).unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![0, 1, 2, 3]);
    assert_eq!(summary.outcome(), DumpOutcome::Partial);
    assert_eq!(summary.segment_failures.len(), 1);
    assert_eq!(summary.segment_failures[0].path, segment.path());
    assert!(summary.segment_failures[0].reason.contains("truncated"));
}

#[test]
fn later_segments_survive_an_earlier_failure() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    let first = fixture.write_segment(0, &[block(0), block(1)]).unwrap();
    fixture.write_segment(2, &[block(2), block(3)]).unwrap();
    fs::write(first.path(), b"garbage that is not a segment").unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![2, 3]);
    assert_eq!(summary.outcome(), DumpOutcome::Partial);
    assert_eq!(summary.segments_read, 1);
}

#[test]
fn corrupt_frame_is_skipped() {
    let dirs = DumpDirs::new();
    let segment = dirs
        .fixture()
        .write_segment(0, &[block(0), block(1), block(2)])
        .unwrap();

    // Flip the last byte of the file: the third frame's checksum.
    let mut bytes = fs::read(segment.path()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(segment.path(), &bytes).unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![0, 1]);
    assert_eq!(summary.record_failures.len(), 1);
    assert!(summary.record_failures[0].offset.is_some());
    assert_eq!(summary.outcome(), DumpOutcome::Partial);
}

#[test]
fn torn_tail_of_open_segment_is_not_an_error() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    let mut writer = fixture.segment_writer(0).unwrap();
    for record in JournalFixture::records(0, &[block(0), block(1)]).unwrap() {
        writer.append(&record).unwrap();
    }
    // Length prefix promising more bytes than were written.
    writer.append_raw(&[64, 0, 0, 0, 1, 2, 3]).unwrap();
    writer.into_open().unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![0, 1]);
    assert_eq!(summary.outcome(), DumpOutcome::Success);
}

#[test]
fn segment_ending_at_max_index_is_ignored() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    let bogus = fixture.write_segment(0, &[block(0)]).unwrap();
    fixture.write_segment(1, &[block(1)]).unwrap();
    let renamed = bogus
        .path()
        .with_file_name(format!("log_0-{}", u64::MAX));
    fs::rename(bogus.path(), &renamed).unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![1]);
    assert_eq!(summary.segments_listed, 1);
    assert_eq!(summary.outcome(), DumpOutcome::Success);
}
