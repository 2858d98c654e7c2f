//! Argument matches to dump configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::ArgMatches;
use raftdump_core::Shard;
use raftdump_engine::DumpConfig;
use uuid::Uuid;

/// Build a [`DumpConfig`] from parsed arguments.
pub fn matches_to_config(matches: &ArgMatches) -> anyhow::Result<DumpConfig> {
    let input = required_path(matches, "input")?;
    let output = required_path(matches, "output")?;
    let shard = matches
        .get_one::<String>("shard")
        .cloned()
        .ok_or_else(|| anyhow!("--shard is required"))?;

    if shard.parse::<Shard>().is_err() {
        tracing::warn!(
            shard = %shard,
            "Not a built-in shard, only entries that name this owner will match"
        );
    }

    let mut config = DumpConfig::new(input, output, shard);
    if let Some(start) = matches.get_one::<u64>("start") {
        config = config.with_start(*start);
    }
    if let Some(end) = matches.get_one::<u64>("end") {
        config = config.with_end(*end);
    }
    if let Some(group) = matches.get_one::<String>("group-id") {
        let group_id =
            Uuid::parse_str(group).with_context(|| format!("Invalid group id: {}", group))?;
        config = config.with_group_id(group_id);
    }
    if let Some(name) = matches.get_one::<String>("entry-file") {
        config = config.with_entry_file_name(name.clone());
    }

    config.validate()?;
    Ok(config)
}

fn required_path(matches: &ArgMatches, name: &str) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow!("--{} is required", name))
}
