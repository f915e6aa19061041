use super::snapshot::{open, resolve_snapshot_path};
use super::Choice;
use dashvote::clock::{Clock, SystemClock};
use dashvote::ledger::ObjectRef;

/// Cast a vote on the local ledger
///
/// Fails if the proposal is expired or delisted, or if the voter already
/// voted on it. On success the voter receives a receipt.
pub fn execute(
    snapshot: Option<String>,
    proposal: String,
    voter: String,
    choice: Choice,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_snapshot_path(snapshot);
    let ledger = open(&path)?;
    let proposal = ObjectRef::parse(&proposal)?;

    let receipt = ledger.cast_vote(
        &proposal,
        &voter,
        matches!(choice, Choice::Yes),
        SystemClock.now_ms(),
    )?;
    ledger.save_snapshot(&path)?;

    println!("🗳️  Vote recorded on {}", proposal);
    println!("   Receipt: {}", receipt.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashvote::ledger::MemoryLedger;
    use tempfile::TempDir;

    #[test]
    fn test_vote_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let ledger = MemoryLedger::new();
        let d = ledger.deploy();
        let id = ledger
            .create_proposal(&d.admin_cap, "A", "a", u64::MAX, "0xadmin")
            .unwrap();
        ledger.save_snapshot(&path).unwrap();

        let snapshot = Some(path.to_string_lossy().to_string());
        execute(snapshot.clone(), id.to_string(), "0xv".to_string(), Choice::No).unwrap();
        let err = execute(snapshot, id.to_string(), "0xv".to_string(), Choice::Yes).unwrap_err();
        assert!(err.to_string().contains("already voted"));

        let reloaded = MemoryLedger::load_snapshot(&path).unwrap();
        assert_eq!(reloaded.proposal(&id).unwrap().voted_no_count, 1);
    }
}
