//! Ledger objects and access.
//!
//! - `types`: decoded entities and errors
//! - `decode`: checked decoding of raw object payloads
//! - `traits`: the query seam the dashboard reads through
//! - `memory`: in-memory ledger applying the package rules

pub mod decode;
pub mod memory;
pub mod traits;
pub mod types;

pub use memory::{Deployment, MemoryLedger};
pub use traits::{fetch_dashboard, fetch_proposal, fetch_vote_nfts, vote_nft_type, LedgerQuery};
pub use types::{
    Dashboard, LedgerError, LedgerResult, ObjectRef, Proposal, ProposalStatus, VoteNft,
};
