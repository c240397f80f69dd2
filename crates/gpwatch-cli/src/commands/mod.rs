//! Subcommand implementations.

pub mod release;
