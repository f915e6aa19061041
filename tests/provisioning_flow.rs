//! Integration test for end-to-end provisioning.
//!
//! Covers the batch flow against an in-memory ledger:
//! 1. Deploy the package (admin cap + dashboard)
//! 2. Generate a create/register script for N proposals
//! 3. Execute the script
//! 4. Read the dashboard back and build the board

use dashvote::clock::{Clock, FixedClock};
use dashvote::ledger::{fetch_dashboard, MemoryLedger, ObjectRef};
use dashvote::proposals::{build_board, CardBody, EffectiveStatus};
use dashvote::provisioning::{generate, GeneratorParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

const NOW: i64 = 1_790_000_000_000;

fn params_for(ledger: &MemoryLedger, count: i64) -> GeneratorParams {
    let deployment = ledger.deployment().unwrap();
    GeneratorParams {
        package: deployment.package,
        admin_cap: deployment.admin_cap,
        dashboard: deployment.dashboard,
        count,
    }
}

#[tokio::test]
async fn test_generated_script_provisions_dashboard() {
    let ledger = MemoryLedger::new();
    let deployment = ledger.deploy();
    let clock = FixedClock::from_millis(NOW).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let script = generate(&params_for(&ledger, 5), &clock, &mut rng).unwrap();
    assert_eq!(script.len(), 10);

    let created = ledger.execute_script(&script, "0xadmin").unwrap();
    assert_eq!(created.len(), 5);

    let dashboard = fetch_dashboard(&ledger, &deployment.dashboard).await.unwrap();
    assert_eq!(dashboard.proposals_ids, created);

    let cards = build_board(&ledger, &dashboard, &[], clock.now_ms()).await;
    assert_eq!(cards.len(), 5);

    let keys: HashSet<&ObjectRef> = cards.iter().map(|c| &c.key).collect();
    assert_eq!(keys.len(), 5);

    let mut last_deadline = 0;
    for (card, id) in cards.iter().zip(&created) {
        assert_eq!(&card.key, id);
        let proposal = ledger.proposal(id).unwrap();
        assert_eq!(proposal.creator, "0xadmin");
        assert!(proposal.expiration_ms > last_deadline);
        last_deadline = proposal.expiration_ms;

        match &card.body {
            CardBody::Ready(view) => {
                assert_eq!(view.status, EffectiveStatus::Active);
                assert_eq!((view.yes, view.no), (0, 0));
                assert!(view.title.starts_with("Proposal "));
                assert!(card.can_vote());
            }
            other => panic!("expected a ready card, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_repeated_batches_append_in_order() {
    let ledger = MemoryLedger::new();
    let deployment = ledger.deploy();
    let clock = FixedClock::from_millis(NOW).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let first = generate(&params_for(&ledger, 2), &clock, &mut rng).unwrap();
    let second = generate(&params_for(&ledger, 3), &clock, &mut rng).unwrap();

    let mut created = ledger.execute_script(&first, "0xadmin").unwrap();
    created.extend(ledger.execute_script(&second, "0xadmin").unwrap());

    let dashboard = fetch_dashboard(&ledger, &deployment.dashboard).await.unwrap();
    assert_eq!(dashboard.proposals_ids, created);
    assert_eq!(dashboard.proposals_ids.len(), 5);
}

#[test]
fn test_empty_batch_changes_nothing() {
    let ledger = MemoryLedger::new();
    let deployment = ledger.deploy();
    let clock = FixedClock::from_millis(NOW).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let script = generate(&params_for(&ledger, 0), &clock, &mut rng).unwrap();
    assert!(script.is_empty());
    assert_eq!(script.render(), "sui client ptb");

    assert!(ledger.execute_script(&script, "0xadmin").unwrap().is_empty());
    assert!(ledger
        .dashboard(&deployment.dashboard)
        .unwrap()
        .proposals_ids
        .is_empty());
}

#[test]
fn test_negative_count_is_rejected() {
    let ledger = MemoryLedger::new();
    ledger.deploy();
    let clock = FixedClock::from_millis(NOW).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    assert!(generate(&params_for(&ledger, -1), &clock, &mut rng).is_err());
}

#[test]
fn test_script_for_foreign_dashboard_commits_nothing() {
    let ledger = MemoryLedger::new();
    let deployment = ledger.deploy();
    let clock = FixedClock::from_millis(NOW).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let mut params = params_for(&ledger, 2);
    params.dashboard = ObjectRef::parse("0xdead").unwrap();
    let script = generate(&params, &clock, &mut rng).unwrap();

    assert!(ledger.execute_script(&script, "0xadmin").is_err());
    assert!(ledger
        .dashboard(&deployment.dashboard)
        .unwrap()
        .proposals_ids
        .is_empty());
}
