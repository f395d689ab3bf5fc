//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod doctor;
mod migrate;
mod status;

use std::path::PathBuf;

/// bbk - maintenance CLI for the bridgebook data root
#[derive(Parser, Debug)]
#[command(
    name = "bbk",
    version,
    about = "Maintenance CLI for the bridgebook data root",
    long_about = "Inspect, migrate, and repair the flat-file directory/runbook store"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert legacy CSV files into the JSON store (backup-gated)
    Migrate(migrate::MigrateArgs),

    /// Remove orphaned .tmp and .lock artifacts from the data root
    Doctor(doctor::DoctorArgs),

    /// Show data root contents, record counts, and lock state
    Status(status::StatusArgs),

    /// Print the resolved data root path
    Path,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Migrate(args) => migrate::execute(args),
            Commands::Doctor(args) => doctor::execute(args),
            Commands::Status(args) => status::execute(args),
            Commands::Path => {
                println!("{}", bridgebook_core::home::get_data_dir()?.display());
                Ok(())
            }
        }
    }
}

/// Resolve the data root from an explicit flag or the environment.
fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(root) => Ok(root),
        None => bridgebook_core::home::get_data_dir(),
    }
}
