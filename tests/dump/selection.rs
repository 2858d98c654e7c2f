//! Range and shard filtering across segments.

use crate::common::*;

/// Two segments of five entries each; "A" owns the even sequence numbers.
fn two_segments(dirs: &DumpDirs) {
    let entries: Vec<_> = (0..10)
        .map(|seq| owned_by(seq, if seq % 2 == 0 { "A" } else { "B" }))
        .collect();
    let fixture = dirs.fixture();
    fixture.write_segment(0, &entries[..5]).unwrap();
    fixture.write_segment(5, &entries[5..]).unwrap();
}

#[test]
fn range_and_shard_across_segments() {
    let dirs = DumpDirs::new();
    two_segments(&dirs);

    let summary = Dumper::new(dirs.config("A").with_start(3).with_end(7))
        .run()
        .unwrap();

    assert_eq!(sequences(&dirs.written()), vec![4, 6]);
    assert_eq!(summary.outcome(), DumpOutcome::Success);
    assert!(summary.snapshot.is_none());
    assert_eq!(summary.segments_read, 2);
    assert_eq!(summary.entries_decoded, 10);
    assert_eq!(summary.selection.selected, 2);
}

#[test]
fn shard_name_is_case_insensitive() {
    let dirs = DumpDirs::new();
    two_segments(&dirs);

    Dumper::new(dirs.config("a")).run().unwrap();
    assert_eq!(sequences(&dirs.written()), vec![0, 2, 4, 6, 8]);
}

#[test]
fn empty_range_writes_nothing() {
    let dirs = DumpDirs::new();
    two_segments(&dirs);

    let summary = Dumper::new(dirs.config("A").with_start(4).with_end(4))
        .run()
        .unwrap();
    assert!(dirs.written().is_empty());
    assert_eq!(summary.selection.out_of_range, 10);
}

#[test]
fn nested_batches_are_flattened_in_order() {
    let dirs = DumpDirs::new();
    let batch = JournalEntry::aggregate(
        1,
        vec![
            block(2),
            JournalEntry::aggregate(3, vec![block(4), JournalEntry::aggregate(5, vec![block(6)])]),
            block(7),
        ],
    );
    dirs.fixture()
        .write_segment(0, &[block(0), batch, block(8)])
        .unwrap();

    Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    let written = dirs.written();
    assert_eq!(sequences(&written), vec![0, 2, 4, 6, 7, 8]);
    assert!(written
        .iter()
        .all(|line| line.json.get("journal_entries").is_none()));
}

#[test]
fn placeholders_are_dropped() {
    let dirs = DumpDirs::new();
    dirs.fixture()
        .write_segment(
            0,
            &[
                JournalEntry::new(0),
                block(1),
                JournalEntry::aggregate(2, vec![JournalEntry::new(3)]),
                JournalEntry::new(4),
            ],
        )
        .unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![1]);
    assert_eq!(summary.selection.placeholders, 3);
}

#[test]
fn two_fields_abort_the_run() {
    let dirs = DumpDirs::new();
    let mut bad = block(1);
    bad.inode_file = Some(InodeFileEntry::default());
    dirs.fixture().write_segment(0, &[block(0), bad]).unwrap();

    let mut dumper = Dumper::new(dirs.config("BlockMaster"));
    let err = dumper.run().unwrap_err();

    assert!(matches!(err, raftdump::DumpError::StructuralCorruption(_)));
    assert!(err
        .to_string()
        .contains("should never set multiple fields"));
}

#[test]
fn open_segment_is_read() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    fixture.write_segment(0, &[block(0), block(1)]).unwrap();
    fixture.write_open_segment(2, &[block(2)]).unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    assert_eq!(sequences(&dirs.written()), vec![0, 1, 2]);
    assert_eq!(summary.segments_read, 2);
    assert_eq!(summary.segment_gaps, 0);
}
