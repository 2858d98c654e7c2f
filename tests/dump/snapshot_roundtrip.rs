//! Snapshot reconstruction and integrity checks.

use std::fs;

use crate::common::*;
use raftdump::DumpError;

fn snapshot_files() -> Vec<(&'static str, &'static [u8], bool)> {
    vec![
        ("inodes", &b"inode table contents"[..], true),
        ("blocks/part-0", &b"block table part 0"[..], true),
        ("blocks/part-1", &b"block table part 1"[..], true),
        ("README", &b"no digest for this one"[..], false),
    ]
}

#[test]
fn verified_snapshot_is_byte_identical() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    let source = fixture.write_snapshot(3, 120, &snapshot_files()).unwrap();
    fixture.write_segment(121, &[block(121)]).unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    let snapshot = summary.snapshot.as_ref().unwrap();
    assert_eq!((snapshot.term, snapshot.index), (3, 120));
    assert_eq!(snapshot.files, 4);
    assert_eq!(snapshot.unverified_files, 1);
    assert!(snapshot
        .checkpoint_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("120-"));

    let expected: Vec<_> = tree_contents(&source)
        .into_iter()
        .filter(|(path, _)| path.extension().map_or(true, |ext| ext != "sha256"))
        .collect();
    assert_eq!(tree_contents(&snapshot.checkpoint_dir), expected);

    assert_eq!(sequences(&dirs.written()), vec![121]);
}

#[test]
fn latest_snapshot_wins() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    fixture
        .write_snapshot(1, 500, &[("old", &b"old"[..], true)])
        .unwrap();
    fixture
        .write_snapshot(2, 100, &[("new", &b"new"[..], true)])
        .unwrap();

    let summary = Dumper::new(dirs.config("BlockMaster")).run().unwrap();

    let snapshot = summary.snapshot.unwrap();
    assert_eq!((snapshot.term, snapshot.index), (2, 100));
    assert!(snapshot.checkpoint_dir.join("new").is_file());
}

#[test]
fn corrupted_snapshot_aborts_before_log() {
    let dirs = DumpDirs::new();
    let fixture = dirs.fixture();
    let source = fixture.write_snapshot(3, 120, &snapshot_files()).unwrap();
    fixture.write_segment(121, &[block(121)]).unwrap();

    let target = source.join("blocks").join("part-1");
    let mut bytes = fs::read(&target).unwrap();
    bytes[0] ^= 0x01;
    fs::write(&target, &bytes).unwrap();

    let mut dumper = Dumper::new(dirs.config("BlockMaster"));
    let err = dumper.run().unwrap_err();

    assert!(err.is_integrity_failure());
    assert!(matches!(
        err,
        DumpError::Snapshot(raftdump::SnapshotError::IntegrityMismatch { ref path, .. })
            if path.ends_with("blocks/part-1")
    ));
    assert!(!dirs.entry_file().exists());
    // The incomplete checkpoint is removed.
    let leftovers: Vec<_> = fs::read_dir(dirs.output.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn snapshot_is_materialized_regardless_of_range() {
    let dirs = DumpDirs::new();
    dirs.fixture()
        .write_snapshot(1, 10, &[("inodes", &b"data"[..], true)])
        .unwrap();

    let summary = Dumper::new(dirs.config("NoSuchShard").with_start(0).with_end(0))
        .run()
        .unwrap();

    let snapshot = summary.snapshot.unwrap();
    assert_eq!(fs::read(snapshot.checkpoint_dir.join("inodes")).unwrap(), b"data");
}
