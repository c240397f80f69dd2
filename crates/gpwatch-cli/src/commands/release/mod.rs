//! Release subcommand implementations.

mod check;
mod reconcile;
mod versions;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use gpwatch_core::CycleMatch;

#[derive(Args, Debug)]
pub struct ReleaseCommand {
    #[command(subcommand)]
    pub command: ReleaseSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseSubcommand {
    /// Show the newest known version per release cycle
    Versions(versions::VersionsArgs),

    /// Dry-run comparison against a tracker document
    Check(check::CheckArgs),

    /// Full pass: compare and open change requests
    Reconcile(reconcile::ReconcileArgs),
}

pub async fn handle(cmd: ReleaseCommand) -> Result<()> {
    match cmd.command {
        ReleaseSubcommand::Versions(args) => versions::run(args).await,
        ReleaseSubcommand::Check(args) => check::run(args).await,
        ReleaseSubcommand::Reconcile(args) => reconcile::run(args).await,
    }
}

/// Cycle matching rule, as a CLI flag.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum MatchRule {
    /// Derive the cycle from the version's major.minor prefix
    #[default]
    VersionPrefix,
    /// Use the record's component tag as the cycle identifier
    ComponentTag,
}

impl From<MatchRule> for CycleMatch {
    fn from(rule: MatchRule) -> Self {
        match rule {
            MatchRule::VersionPrefix => CycleMatch::VersionPrefix,
            MatchRule::ComponentTag => CycleMatch::ComponentTag,
        }
    }
}
