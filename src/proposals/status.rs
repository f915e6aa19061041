//! Effective lifecycle status.
//!
//! Derived from the stored administrative status and the current time on
//! every read. Precedence: Delisted, then Expired, then Active.

use crate::ledger::{Proposal, ProposalStatus};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Deadline display format, e.g. "October 18, 2027, 01:02:03 PM" (UTC).
const DEADLINE_FORMAT: &str = "%B %d, %Y, %I:%M:%S %p";

/// Derived lifecycle state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectiveStatus {
    Active,
    Expired,
    Delisted,
}

impl EffectiveStatus {
    /// Only active proposals accept votes.
    pub fn permits_voting(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Delisted => "Delisted",
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the effective status.
///
/// Delisting wins over time. The expiration instant itself counts as expired.
pub fn resolve_status(raw: ProposalStatus, expiration_ms: u64, now_ms: u64) -> EffectiveStatus {
    match raw {
        ProposalStatus::Delisted => EffectiveStatus::Delisted,
        ProposalStatus::Active if now_ms >= expiration_ms => EffectiveStatus::Expired,
        ProposalStatus::Active => EffectiveStatus::Active,
    }
}

impl Proposal {
    pub fn effective_status(&self, now_ms: u64) -> EffectiveStatus {
        resolve_status(self.status, self.expiration_ms, now_ms)
    }
}

/// Status line shown on a card: the status name once closed, else the deadline.
pub fn format_deadline(status: EffectiveStatus, expiration_ms: u64) -> String {
    match status {
        EffectiveStatus::Delisted | EffectiveStatus::Expired => status.to_string(),
        EffectiveStatus::Active => i64::try_from(expiration_ms)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|deadline| deadline.format(DEADLINE_FORMAT).to_string())
            .unwrap_or_else(|| format!("@{}ms", expiration_ms)),
    }
}

/// Time left before expiry, to the second. `None` once expired.
pub fn format_remaining(expiration_ms: u64, now_ms: u64) -> Option<String> {
    if now_ms >= expiration_ms {
        return None;
    }
    let secs = (expiration_ms - now_ms) / 1000;
    Some(humantime::format_duration(Duration::from_secs(secs)).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 1_790_000_000_000;

    #[test]
    fn test_boundary_is_expired() {
        assert_eq!(
            resolve_status(ProposalStatus::Active, T, T),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_just_before_boundary_is_active() {
        assert_eq!(
            resolve_status(ProposalStatus::Active, T, T - 1),
            EffectiveStatus::Active
        );
    }

    #[test]
    fn test_delisted_overrides_future_expiration() {
        assert_eq!(
            resolve_status(ProposalStatus::Delisted, T + 1000, T),
            EffectiveStatus::Delisted
        );
    }

    #[test]
    fn test_delisted_and_expired_is_delisted() {
        assert_eq!(
            resolve_status(ProposalStatus::Delisted, 0, T),
            EffectiveStatus::Delisted
        );
    }

    #[test]
    fn test_past_expiration_is_expired() {
        assert_eq!(
            resolve_status(ProposalStatus::Active, 0, T),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_permits_voting() {
        assert!(EffectiveStatus::Active.permits_voting());
        assert!(!EffectiveStatus::Expired.permits_voting());
        assert!(!EffectiveStatus::Delisted.permits_voting());
    }

    #[test]
    fn test_format_deadline_active() {
        // 2027-10-18T13:02:03Z
        let ms = Utc
            .with_ymd_and_hms(2027, 10, 18, 13, 2, 3)
            .unwrap()
            .timestamp_millis() as u64;
        assert_eq!(
            format_deadline(EffectiveStatus::Active, ms),
            "October 18, 2027, 01:02:03 PM"
        );
    }

    #[test]
    fn test_format_deadline_closed() {
        assert_eq!(format_deadline(EffectiveStatus::Expired, T), "Expired");
        assert_eq!(format_deadline(EffectiveStatus::Delisted, T), "Delisted");
    }

    #[test]
    fn test_format_deadline_out_of_range() {
        assert_eq!(
            format_deadline(EffectiveStatus::Active, u64::MAX),
            format!("@{}ms", u64::MAX)
        );
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(T + 90_000, T).as_deref(), Some("1m 30s"));
        assert_eq!(format_remaining(T, T), None);
        assert_eq!(format_remaining(T, T + 1), None);
    }
}
