//! raftdump: offline journal dump.
//!
//! `raftdump --input <dir> --output <dir> --shard <name> [--start N] [--end N]`
//!
//! Exit status: 0 when everything was read, 2 when the dump completed but
//! some segments or records could not be read, 1 on a fatal error.

mod commands;
mod format;
mod parse;

use std::process;

use anyhow::Context;
use clap::ArgMatches;
use raftdump_engine::{DumpOutcome, Dumper};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_summary, format_summary_json};
use parse::matches_to_config;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FATAL: i32 = 1;
const EXIT_PARTIAL: i32 = 2;

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let exit_code = match run(&matches) {
        Ok(DumpOutcome::Success) => EXIT_SUCCESS,
        Ok(DumpOutcome::Partial) => EXIT_PARTIAL,
        Err(e) => {
            eprintln!("(error) {:#}", e);
            EXIT_FATAL
        }
    };
    process::exit(exit_code);
}

/// Log to stderr; `RUST_LOG` overrides the default `info` unless `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(matches: &ArgMatches) -> anyhow::Result<DumpOutcome> {
    let config = matches_to_config(matches)?;
    tracing::info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        shard = %config.shard,
        start = config.start,
        end = config.end,
        "Starting dump"
    );

    let mut dumper = Dumper::new(config);
    let summary = dumper.run().context("Dump failed")?;

    if matches.get_flag("summary-json") {
        println!("{}", format_summary_json(&summary)?);
    } else {
        eprintln!("{}", format_summary(&summary));
    }
    Ok(summary.outcome())
}
