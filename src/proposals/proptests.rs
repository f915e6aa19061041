//! Property-based tests for status resolution
//!
//! Tests for:
//! - Precedence: Delisted always wins
//! - Time: inclusive expiry boundary, monotonic in `now`
//! - Display: deadline text only for active proposals

use super::status::{format_deadline, resolve_status, EffectiveStatus};
use crate::ledger::ProposalStatus;
use proptest::prelude::*;

fn raw_status() -> impl Strategy<Value = ProposalStatus> {
    prop_oneof![Just(ProposalStatus::Active), Just(ProposalStatus::Delisted)]
}

proptest! {
    /// Property: Delisted wins regardless of expiration and now
    #[test]
    fn delisted_always_wins(expiration in any::<u64>(), now in any::<u64>()) {
        prop_assert_eq!(
            resolve_status(ProposalStatus::Delisted, expiration, now),
            EffectiveStatus::Delisted
        );
    }

    /// Property: An active proposal is expired exactly when now >= expiration
    #[test]
    fn active_expires_at_boundary(expiration in any::<u64>(), now in any::<u64>()) {
        let status = resolve_status(ProposalStatus::Active, expiration, now);
        if now >= expiration {
            prop_assert_eq!(status, EffectiveStatus::Expired);
        } else {
            prop_assert_eq!(status, EffectiveStatus::Active);
        }
    }

    /// Property: Once expired, a later instant never reactivates the proposal
    #[test]
    fn expiry_is_monotonic(
        raw in raw_status(),
        expiration in any::<u64>(),
        now in any::<u64>(),
        delta in any::<u64>(),
    ) {
        let earlier = resolve_status(raw, expiration, now);
        let later = resolve_status(raw, expiration, now.saturating_add(delta));
        if earlier != EffectiveStatus::Active {
            prop_assert_eq!(earlier, later);
        }
    }

    /// Property: Only active proposals permit voting
    #[test]
    fn voting_gate_matches_status(
        raw in raw_status(),
        expiration in any::<u64>(),
        now in any::<u64>(),
    ) {
        let status = resolve_status(raw, expiration, now);
        prop_assert_eq!(status.permits_voting(), status == EffectiveStatus::Active);
    }

    /// Property: Deadline text is ordered like the instants it renders
    #[test]
    fn deadline_text_is_monotonic(a in 0u64..4_000_000_000_000, b in 0u64..4_000_000_000_000) {
        let fmt = "%B %d, %Y, %I:%M:%S %p";
        let parse = |ms: u64| {
            let text = format_deadline(EffectiveStatus::Active, ms);
            chrono::NaiveDateTime::parse_from_str(&text, fmt).unwrap()
        };
        let (ta, tb) = (parse(a), parse(b));
        if a / 1000 < b / 1000 {
            prop_assert!(ta < tb);
        } else if a / 1000 == b / 1000 {
            prop_assert_eq!(ta, tb);
        }
    }
}
