//! bbk - maintenance CLI for the bridgebook data root
//!
//! A thin CLI over the bridgebook-core document store: migrate legacy CSV
//! data, inspect store state, and clean up transient artifacts left by
//! unclean shutdowns.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    bridgebook_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
