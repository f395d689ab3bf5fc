//! Doctor command implementation - clean up transient write artifacts
//!
//! A writer killed between its temp write and rename leaves a `.tmp`
//! sibling; a crashed process leaves its `.lock` sidecar behind. Neither
//! is part of the data model, and both are safe to delete once no live
//! process holds the lock.

use anyhow::Result;
use bridgebook_core::io::lock;
use clap::Args;
use std::path::{Path, PathBuf};

use super::resolve_root;

/// Remove orphaned .tmp and .lock artifacts
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Data root directory (defaults to BBK_DATA_DIR or the platform dir)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Show what would be removed without modifying anything
    #[arg(long)]
    dry_run: bool,
}

/// Execute the doctor command
pub fn execute(args: DoctorArgs) -> Result<()> {
    let root = resolve_root(args.root)?;
    if !root.is_dir() {
        anyhow::bail!("data root not found at {}", root.display());
    }

    if args.dry_run {
        println!("DRY RUN - no files will be removed\n");
    }

    let mut removed = 0usize;
    let mut held = 0usize;

    for entry in std::fs::read_dir(&root)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if name.ends_with(".tmp") {
            removed += reap(&path, "stranded temp", args.dry_run);
        } else if name.ends_with(".lock") {
            // The sidecar names the file it guards; only an unheld lock is
            // an orphan.
            let data_path = path.with_file_name(name.trim_end_matches(".lock"));
            if lock::is_locked(&data_path) {
                println!("  held    {name} (live writer, skipping)");
                held += 1;
            } else {
                removed += reap(&path, "orphaned lock", args.dry_run);
            }
        }
    }

    println!();
    println!("{removed} artifact(s) removed, {held} in active use");
    Ok(())
}

fn reap(path: &Path, kind: &str, dry_run: bool) -> usize {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
    if dry_run {
        println!("  would remove {kind}: {name}");
        return 0;
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            println!("  removed {kind}: {name}");
            1
        }
        Err(e) => {
            println!("  failed to remove {name}: {e}");
            0
        }
    }
}
