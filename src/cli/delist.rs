use super::snapshot::{deployment, open, resolve_snapshot_path};
use dashvote::ledger::ObjectRef;

/// Delist a proposal on the local ledger using the deployment's admin capability
pub fn execute(
    snapshot: Option<String>,
    proposal: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_snapshot_path(snapshot);
    let ledger = open(&path)?;
    let deployment = deployment(&ledger)?;
    let proposal = ObjectRef::parse(&proposal)?;

    ledger.delist(&proposal, &deployment.admin_cap)?;
    ledger.save_snapshot(&path)?;

    println!("🚫 Delisted {}", proposal);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashvote::ledger::{MemoryLedger, ProposalStatus};
    use tempfile::TempDir;

    #[test]
    fn test_delist_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let ledger = MemoryLedger::new();
        let d = ledger.deploy();
        let id = ledger
            .create_proposal(&d.admin_cap, "A", "a", u64::MAX, "0xadmin")
            .unwrap();
        ledger.save_snapshot(&path).unwrap();

        execute(Some(path.to_string_lossy().to_string()), id.to_string()).unwrap();

        let reloaded = MemoryLedger::load_snapshot(&path).unwrap();
        assert_eq!(reloaded.proposal(&id).unwrap().status, ProposalStatus::Delisted);
    }

    #[test]
    fn test_delist_unknown_proposal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let ledger = MemoryLedger::new();
        ledger.deploy();
        ledger.save_snapshot(&path).unwrap();

        let err = execute(Some(path.to_string_lossy().to_string()), "0xabc".to_string())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
