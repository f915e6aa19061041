use super::snapshot::{deployment, open, resolve_snapshot_path};
use dashvote::clock::{Clock, SystemClock};
use dashvote::ledger::{fetch_dashboard, fetch_vote_nfts, ObjectRef};
use dashvote::proposals::{build_board, render_board};

/// Show every proposal registered on the dashboard
///
/// With `--voter`, proposals that voter already voted on are marked.
pub async fn execute(
    snapshot: Option<String>,
    dashboard: Option<String>,
    voter: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_snapshot_path(snapshot);
    let ledger = open(&path)?;
    let deployment = deployment(&ledger)?;

    let dashboard_id = match dashboard {
        Some(raw) => ObjectRef::parse(&raw)?,
        None => deployment.dashboard.clone(),
    };

    let board = fetch_dashboard(&ledger, &dashboard_id).await?;
    let receipts = match &voter {
        Some(voter) => fetch_vote_nfts(&ledger, voter, &deployment.package).await?,
        None => Vec::new(),
    };

    let cards = build_board(&ledger, &board, &receipts, SystemClock.now_ms()).await;

    println!("📋 Dashboard {} ({} proposals)", board.id, cards.len());
    println!();
    print!("{}", render_board(&cards));
    Ok(())
}
