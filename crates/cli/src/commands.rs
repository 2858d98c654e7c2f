//! Clap command definition.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the CLI command.
pub fn build_cli() -> Command {
    Command::new("raftdump")
        .about("Dump a consensus-replicated journal straight from disk")
        .long_about(
            "Reads the log segments and latest snapshot of a journal directory without \
             contacting the cluster. Selected entries are written one per line to \
             <output>/edits.txt and the snapshot is reconstructed under \
             <output>/<index>-<mtime>/. The view may be stale.",
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .help("Journal directory containing raft/<group-id>")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output directory for entries and checkpoint files")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("shard")
                .long("shard")
                .short('s')
                .help("Owner to dump, e.g. FileSystemMaster (case-insensitive)")
                .required(true),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .help("First sequence number to dump (inclusive, default: 0)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .help("Sequence number to stop at (exclusive, default: unbounded)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("group-id")
                .long("group-id")
                .help("Consensus group id (default: 02511d47-d67c-49a3-9011-abb3109a44c1)"),
        )
        .arg(
            Arg::new("entry-file")
                .long("entry-file")
                .help("Entry file name inside the output directory (default: edits.txt)"),
        )
        .arg(
            Arg::new("summary-json")
                .long("summary-json")
                .help("Print the run summary as JSON on stdout")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log at debug level")
                .action(ArgAction::SetTrue),
        )
}
