//! Status command implementation - inspect the data root

use anyhow::Result;
use bridgebook_core::config::StoreConfig;
use bridgebook_core::home::files;
use bridgebook_core::io::lock;
use bridgebook_core::migrate::MigrationCoordinator;
use clap::Args;
use std::path::PathBuf;

use super::resolve_root;

/// Show data root contents, record counts, and lock state
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Data root directory (defaults to BBK_DATA_DIR or the platform dir)
    #[arg(long)]
    root: Option<PathBuf>,
}

const DOCUMENTS: [&str; 6] = [
    files::CONTACTS,
    files::SERVERS,
    files::ONCALL,
    files::BRIDGE_GROUPS,
    files::NOTES,
    files::BRIDGE_HISTORY,
];

/// Execute the status command
pub fn execute(args: StatusArgs) -> Result<()> {
    let root = resolve_root(args.root)?;
    println!("Data root: {}\n", root.display());

    if !root.is_dir() {
        println!("  (directory does not exist yet)");
        return Ok(());
    }

    let store = StoreConfig::load(&root).document_store();

    println!("  {:<20} {:>8} {:>8}", "Document", "Records", "Locked");
    println!("  {}", "─".repeat(40));
    for name in DOCUMENTS {
        let path = root.join(name);
        let records = match store.read(&path)? {
            None => "-".to_string(),
            Some(bytes) => match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(serde_json::Value::Array(items)) => items.len().to_string(),
                Ok(serde_json::Value::Object(map)) => map.len().to_string(),
                Ok(_) => "?".to_string(),
                Err(_) => "corrupt".to_string(),
            },
        };
        let locked = if lock::is_locked(&path) { "yes" } else { "" };
        println!("  {name:<20} {records:>8} {locked:>8}");
    }

    if MigrationCoordinator::needs_migration(&root) {
        println!("\nLegacy CSV data pending migration: run `bbk migrate`");
    }

    Ok(())
}
