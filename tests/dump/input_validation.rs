//! Input directory checks happen before any output exists.

use crate::common::*;
use raftdump::DumpError;
use uuid::Uuid;

#[test]
fn missing_input_aborts_without_output() {
    let dirs = DumpDirs::new();
    let output = dirs.output.path().join("dump");
    let config = DumpConfig::new(dirs.input.path().join("missing"), &output, "BlockMaster");

    let mut dumper = Dumper::new(config);
    let err = dumper.run().unwrap_err();

    assert!(matches!(err, DumpError::InputNotFound { .. }));
    assert!(err.to_string().starts_with("Input dir does not exist"));
    assert_eq!(dumper.phase(), raftdump::DumpPhase::Fatal);
    assert!(!output.exists());
}

#[test]
fn input_that_is_a_file_aborts() {
    let dirs = DumpDirs::new();
    let file = dirs.input.path().join("journal");
    std::fs::write(&file, b"not a directory").unwrap();

    let err = Dumper::new(DumpConfig::new(&file, dirs.output.path(), "BlockMaster"))
        .run()
        .unwrap_err();

    assert!(matches!(err, DumpError::InputNotADirectory { .. }));
    assert!(!dirs.entry_file().exists());
}

#[test]
fn other_group_is_not_read() {
    let dirs = DumpDirs::new();
    let group = Uuid::new_v4();
    JournalFixture::with_group(dirs.input.path(), group)
        .write_segment(0, &[block(0), block(1)])
        .unwrap();

    let default_group = Dumper::new(dirs.config("BlockMaster")).run().unwrap();
    assert!(default_group.log_missing);
    assert!(dirs.written().is_empty());

    let summary = Dumper::new(dirs.config("BlockMaster").with_group_id(group))
        .run()
        .unwrap();
    assert_eq!(summary.entries_written, 2);
    assert_eq!(sequences(&dirs.written()), vec![0, 1]);
}
