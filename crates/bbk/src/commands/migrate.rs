//! Migrate command implementation - convert legacy CSV files to JSON

use anyhow::Result;
use bridgebook_core::config::StoreConfig;
use bridgebook_core::migrate::MigrationCoordinator;
use bridgebook_core::FolderBackup;
use clap::Args;
use std::path::PathBuf;

use super::resolve_root;

/// Convert legacy CSV data into the JSON store
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Data root directory (defaults to BBK_DATA_DIR or the platform dir)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report whether migration is needed without running it
    #[arg(long)]
    check: bool,
}

/// Execute the migrate command
pub fn execute(args: MigrateArgs) -> Result<()> {
    let root = resolve_root(args.root)?;

    if !MigrationCoordinator::needs_migration(&root) {
        println!("Nothing to migrate: no pending legacy files in {}", root.display());
        return Ok(());
    }

    if args.check {
        println!("Migration needed in {}", root.display());
        return Ok(());
    }

    let store = StoreConfig::load(&root).document_store();
    let coordinator = MigrationCoordinator::new(store);
    let result = coordinator.migrate_all(&root, &FolderBackup);

    if let Some(backup) = &result.backup_path {
        println!("Backup: {}", backup.display());
    }
    println!();
    println!("  {:<12} {:>9} {:>8}", "Category", "Migrated", "Errors");
    println!("  {}", "─".repeat(32));
    for category in &result.categories {
        println!(
            "  {:<12} {:>9} {:>8}",
            category.category,
            category.migrated,
            category.errors.len()
        );
        for error in &category.errors {
            println!("    ! {error}");
        }
    }
    println!();

    if result.success {
        println!("Migration complete: {} records", result.migrated_total());
        Ok(())
    } else {
        anyhow::bail!("migration finished with errors; sources for failed categories were left in place")
    }
}
