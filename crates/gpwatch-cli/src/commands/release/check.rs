//! Check command implementation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gpwatch_core::compute_updates;
use gpwatch_file::{DocumentFile, SnapshotFile};

use crate::output;

use super::MatchRule;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the version snapshot JSON file
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Path to the tracker document
    #[arg(long)]
    pub doc: PathBuf,

    /// Cycle matching rule
    #[arg(long = "match", value_enum, default_value = "version-prefix")]
    pub match_rule: MatchRule,

    /// Print proposals as JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CheckArgs) -> Result<()> {
    let records = SnapshotFile::new(&args.snapshot)
        .load()
        .await
        .context("Failed to load snapshot")?;

    let doc = DocumentFile::new(&args.doc)
        .load()
        .await
        .context("Failed to load tracker document")?;

    let report = compute_updates(
        &records,
        &doc.entries(),
        &BTreeSet::new(),
        args.match_rule.into(),
    );

    if args.json {
        output::json_pretty(&report.proposals)?;
    } else {
        output::render_report(&report);
    }

    Ok(())
}
