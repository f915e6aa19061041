//! Dashvote - proposal dashboard tooling
//!
//! Reads proposals registered on a shared on-ledger dashboard, resolves their
//! effective lifecycle state, and generates batch provisioning scripts that
//! create proposals and register them in a single atomic submission.
//!
//! Key principles:
//! - The ledger is the source of truth; effective status is derived on read
//! - Clock and randomness are injected, never read inline
//! - Raw ledger payloads are decoded into checked types before use

pub mod clock;
pub mod ledger;
pub mod proposals;
pub mod provisioning;
