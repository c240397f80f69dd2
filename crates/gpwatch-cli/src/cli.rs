//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::release::ReleaseCommand;

/// Track GlobalProtect release cycles against an upstream tracker.
#[derive(Parser, Debug)]
#[command(name = "gpwatch")]
#[command(author, version = env!("GPWATCH_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Release-cycle operations
    Release(ReleaseCommand),
}
