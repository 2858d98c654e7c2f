//! Summary output formatting.

use raftdump_engine::{DumpOutcome, DumpSummary};

/// Human-readable run summary.
pub fn format_summary(summary: &DumpSummary) -> String {
    let mut lines = Vec::new();

    match &summary.snapshot {
        Some(snapshot) => lines.push(format!(
            "Snapshot (t:{}, i:{}): {} files, {} bytes -> {}{}",
            snapshot.term,
            snapshot.index,
            snapshot.files,
            snapshot.bytes,
            snapshot.checkpoint_dir.display(),
            if snapshot.unverified_files > 0 {
                format!(" ({} unverified)", snapshot.unverified_files)
            } else {
                String::new()
            }
        )),
        None => lines.push("Snapshot: none".to_string()),
    }

    if summary.log_missing {
        lines.push("Log: no log directory".to_string());
    } else {
        lines.push(format!(
            "Log: {} of {} segments read, {} records, {} entries decoded",
            summary.segments_read,
            summary.segments_listed,
            summary.records_read,
            summary.entries_decoded
        ));
    }

    let selection = &summary.selection;
    lines.push(format!(
        "Selected {} entries ({} out of range, {} other owner, {} unknown owner, {} placeholders)",
        selection.selected,
        selection.out_of_range,
        selection.owner_mismatch,
        selection.owner_unknown,
        selection.placeholders
    ));
    if let Some(path) = &summary.entry_file {
        lines.push(format!("Entries written to {}", path.display()));
    }

    for failure in &summary.segment_failures {
        lines.push(format!(
            "(error) segment {}: {}",
            failure.path.display(),
            failure.reason
        ));
    }
    for failure in &summary.record_failures {
        let location = match (failure.index, failure.offset) {
            (Some(index), _) => format!("index {}", index),
            (None, Some(offset)) => format!("offset {}", offset),
            (None, None) => "unknown position".to_string(),
        };
        lines.push(format!(
            "(error) record in {} at {}: {}",
            failure.segment.display(),
            location,
            failure.reason
        ));
    }

    if summary.outcome() == DumpOutcome::Partial {
        lines.push("Completed with errors".to_string());
    }
    lines.join("\n")
}

/// Machine-readable run summary.
pub fn format_summary_json(summary: &DumpSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({
        "outcome": summary.outcome(),
        "summary": summary,
    }))
}
