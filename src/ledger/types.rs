//! Ledger entity model.
//!
//! These are the decoded shapes of the objects the dashboard reads: proposals,
//! the dashboard aggregate and vote receipts. Raw payload decoding lives in
//! `decode.rs`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum hex digits in a ledger reference (32 bytes).
const MAX_REF_HEX_DIGITS: usize = 64;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Decode mismatch: {0}")]
    DecodeMismatch(String),

    #[error("Voter {voter} already voted on proposal {proposal}")]
    AlreadyVoted { proposal: String, voter: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Proposal {proposal} is not open for voting ({status})")]
    NotVotable { proposal: String, status: String },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl LedgerError {
    /// True for errors the board shows as "cannot render" rather than failing.
    pub fn is_unrenderable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::DecodeMismatch(_))
    }
}

/// Opaque ledger-assigned object reference.
///
/// Always held in canonical form: `0x` followed by 64 lowercase hex digits.
/// Short or mixed-case inputs that name the same address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Parse, validate and canonicalize a reference.
    ///
    /// Accepts `0x` followed by 1 to 64 hex digits in either case.
    pub fn parse(raw: &str) -> LedgerResult<Self> {
        let digits = raw.strip_prefix("0x").ok_or_else(|| {
            LedgerError::InvalidArgument(format!("reference must start with 0x: {:?}", raw))
        })?;

        if digits.is_empty() || digits.len() > MAX_REF_HEX_DIGITS {
            return Err(LedgerError::InvalidArgument(format!(
                "reference must have 1..={} hex digits: {:?}",
                MAX_REF_HEX_DIGITS, raw
            )));
        }

        let padded = format!("{:0>width$}", digits, width = MAX_REF_HEX_DIGITS);
        let bytes = hex::decode(&padded).map_err(|e| {
            LedgerError::InvalidArgument(format!("reference is not hex: {:?} ({})", raw, e))
        })?;

        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    /// Reference for the n-th object minted by a local ledger.
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(format!("0x{:064x}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectRef {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectRef> for String {
    fn from(value: ObjectRef) -> Self {
        value.0
    }
}

/// Administrative status stored on the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum ProposalStatus {
    Active,
    Delisted,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Delisted => "Delisted",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Delisted" => Ok(Self::Delisted),
            other => Err(LedgerError::InvalidArgument(format!(
                "unknown proposal status: {}",
                other
            ))),
        }
    }
}

/// A proposal as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ObjectRef,
    pub title: String,
    pub description: String,
    pub status: ProposalStatus,
    pub voted_yes_count: u64,
    pub voted_no_count: u64,
    /// Unix-epoch milliseconds, fixed at creation.
    pub expiration_ms: u64,
    pub creator: String,
    /// Source of truth against double voting.
    pub voter_registry: HashSet<String>,
}

impl Proposal {
    /// Tallies must account for every registered voter exactly once.
    pub fn tally_is_consistent(&self) -> bool {
        self.voted_yes_count
            .checked_add(self.voted_no_count)
            .is_some_and(|total| total == self.voter_registry.len() as u64)
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.voter_registry.contains(voter)
    }
}

/// Singleton aggregate listing registered proposals in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: ObjectRef,
    pub proposals_ids: Vec<ObjectRef>,
}

/// Receipt proving an identity voted on a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteNft {
    pub id: ObjectRef,
    pub proposal_id: ObjectRef,
    pub url: String,
}
