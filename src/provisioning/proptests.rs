//! Property-based tests for batch provisioning
//!
//! Tests for:
//! - Structure: exactly 2N steps, strict create/register pairing
//! - Dependencies: every register reads its own pair's slot
//! - Time: expirations strictly increase across the batch

use super::generator::{generate, GeneratorParams, CREATE_FUNCTION, REGISTER_FUNCTION};
use super::script::{Arg, Slot};
use crate::clock::FixedClock;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn params(count: i64) -> GeneratorParams {
    GeneratorParams::parse("0x2", "0xa", "0xd", count).unwrap()
}

proptest! {
    /// Property: Step count is exactly twice the proposal count
    #[test]
    fn step_count_is_twice_count(
        count in 0i64..40,
        now_ms in 0i64..4_000_000_000_000,
        seed in any::<u64>(),
    ) {
        let clock = FixedClock::from_millis(now_ms).unwrap();
        let script = generate(&params(count), &clock, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(script.len() as i64, 2 * count);
    }

    /// Property: Each register step consumes exactly the slot of its own create step
    #[test]
    fn register_reads_own_pair_slot(count in 1i64..40, seed in any::<u64>()) {
        let clock = FixedClock::from_millis(1_700_000_000_000).unwrap();
        let script = generate(&params(count), &clock, &mut StdRng::seed_from_u64(seed)).unwrap();

        let mut produced = HashSet::new();
        for pair in script.steps().chunks(2) {
            prop_assert_eq!(pair[0].target.function.as_str(), CREATE_FUNCTION);
            prop_assert_eq!(pair[1].target.function.as_str(), REGISTER_FUNCTION);

            let slot = pair[0].produces().cloned();
            prop_assert!(slot.is_some());
            let slot: Slot = slot.unwrap();
            prop_assert!(produced.insert(slot.clone()), "slot reused: {}", slot);

            let consumed: Vec<&Slot> = pair[1].consumes().collect();
            prop_assert_eq!(consumed, vec![&slot]);
            prop_assert!(pair[0].consumes().next().is_none());
        }
    }

    /// Property: Expirations are strictly increasing in iteration order
    #[test]
    fn expirations_strictly_increase(
        count in 2i64..40,
        now_ms in 0i64..4_000_000_000_000,
        seed in any::<u64>(),
    ) {
        let clock = FixedClock::from_millis(now_ms).unwrap();
        let script = generate(&params(count), &clock, &mut StdRng::seed_from_u64(seed)).unwrap();

        let expirations: Vec<u64> = script
            .steps()
            .chunks(2)
            .map(|pair| match pair[0].args.last() {
                Some(Arg::U64(ms)) => *ms,
                _ => 0,
            })
            .collect();

        prop_assert_eq!(expirations.len() as i64, count);
        prop_assert!(expirations[0] as i64 > now_ms);
        for window in expirations.windows(2) {
            prop_assert!(window[0] < window[1], "{} !< {}", window[0], window[1]);
        }
    }

    /// Property: Negative counts are always rejected
    #[test]
    fn negative_count_rejected(count in i64::MIN..0) {
        let clock = FixedClock::from_millis(0).unwrap();
        prop_assert!(generate(&params(count), &clock, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
