//! Local ledger snapshot access for the offline commands.

use super::config::default_snapshot_path;
use dashvote::ledger::{Deployment, MemoryLedger};
use std::path::{Path, PathBuf};

/// Resolve `--snapshot`, defaulting to the data directory.
pub fn resolve_snapshot_path(snapshot: Option<String>) -> PathBuf {
    snapshot.map(PathBuf::from).unwrap_or_else(default_snapshot_path)
}

/// Open an existing snapshot.
pub fn open(path: &Path) -> Result<MemoryLedger, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!(
            "No ledger snapshot at '{}'. Run `dashvote provision` first.",
            path.display()
        )
        .into());
    }
    Ok(MemoryLedger::load_snapshot(path)?)
}

/// Open a snapshot, creating a freshly deployed ledger if none exists.
pub fn open_or_deploy(path: &Path) -> Result<MemoryLedger, Box<dyn std::error::Error>> {
    if path.exists() {
        return Ok(MemoryLedger::load_snapshot(path)?);
    }

    let ledger = MemoryLedger::new();
    let deployment = ledger.deploy();
    println!("📝 No snapshot found. Deployed a new local ledger:");
    println!("   Package:   {}", deployment.package);
    println!("   Admin cap: {}", deployment.admin_cap);
    println!("   Dashboard: {}", deployment.dashboard);
    println!();
    Ok(ledger)
}

/// The snapshot's deployment, which every offline command operates on.
pub fn deployment(ledger: &MemoryLedger) -> Result<Deployment, Box<dyn std::error::Error>> {
    ledger
        .deployment()
        .ok_or_else(|| "Snapshot has no deployment".into())
}
