//! Versions command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gpwatch_core::collect_candidates;
use gpwatch_file::SnapshotFile;

use crate::output;

use super::MatchRule;

#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Path to the version snapshot JSON file
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Cycle matching rule
    #[arg(long = "match", value_enum, default_value = "version-prefix")]
    pub match_rule: MatchRule,
}

pub async fn run(args: VersionsArgs) -> Result<()> {
    let records = SnapshotFile::new(&args.snapshot)
        .load()
        .await
        .context("Failed to load snapshot")?;

    let set = collect_candidates(&records, args.match_rule.into());

    if set.candidates.is_empty() && set.conflicts.is_empty() {
        eprintln!("{}", "No release cycles found.".dimmed());
    }

    for (cycle, candidate) in &set.candidates {
        output::field(
            &cycle.to_string(),
            &format!("{} ({})", candidate.version, candidate.released),
        );
    }

    for conflict in set.conflicts.values() {
        output::error(&conflict.to_string());
    }

    for parse_error in &set.parse_errors {
        eprintln!("{} {}", "!".yellow(), parse_error);
    }

    Ok(())
}
