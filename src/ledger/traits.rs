//! Ledger query abstraction.
//!
//! The dashboard never talks to a ledger node directly. Everything it reads
//! goes through [`LedgerQuery`], which `MemoryLedger` implements for tests and
//! offline snapshots.

use super::decode::{decode_dashboard, decode_proposal, extract_vote_nfts};
use super::types::{Dashboard, LedgerError, LedgerResult, ObjectRef, Proposal, VoteNft};
use async_trait::async_trait;
use serde_json::Value;

/// Struct name of vote receipts within the proposal module.
pub const VOTE_NFT_STRUCT: &str = "proposal::VoteProofNFT";

/// Fully qualified Move type of vote receipts for a deployed package.
pub fn vote_nft_type(package: &ObjectRef) -> String {
    format!("{}::{}", package, VOTE_NFT_STRUCT)
}

/// Read access to ledger objects.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Fetch an object payload with content. `None` if it does not exist.
    async fn get_object(&self, id: &ObjectRef) -> LedgerResult<Option<Value>>;

    /// Fetch one page of objects of `struct_type` owned by `owner`, starting
    /// after `cursor` (`None` for the first page). Pages are shaped
    /// `{ "data": [ { "data": <object> }, .. ], "hasNextPage": bool, "nextCursor": .. }`.
    async fn owned_objects(
        &self,
        owner: &str,
        struct_type: &str,
        cursor: Option<&str>,
    ) -> LedgerResult<Value>;
}

/// Fetch and decode a proposal.
pub async fn fetch_proposal<Q>(query: &Q, id: &ObjectRef) -> LedgerResult<Proposal>
where
    Q: LedgerQuery + ?Sized,
{
    let payload = query.get_object(id).await?;
    decode_proposal(payload.as_ref())
}

/// Fetch and decode the dashboard.
pub async fn fetch_dashboard<Q>(query: &Q, id: &ObjectRef) -> LedgerResult<Dashboard>
where
    Q: LedgerQuery + ?Sized,
{
    let payload = query.get_object(id).await?;
    decode_dashboard(payload.as_ref())
}

/// Fetch every vote receipt held by `owner`, following page cursors.
pub async fn fetch_vote_nfts<Q>(
    query: &Q,
    owner: &str,
    package: &ObjectRef,
) -> LedgerResult<Vec<VoteNft>>
where
    Q: LedgerQuery + ?Sized,
{
    let struct_type = vote_nft_type(package);
    let mut receipts = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = query
            .owned_objects(owner, &struct_type, cursor.as_deref())
            .await?;
        receipts.extend(extract_vote_nfts(&page));

        if !page.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false) {
            break;
        }

        let next = page
            .get("nextCursor")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                LedgerError::Query("owned objects page has a next page but no cursor".into())
            })?;
        if cursor.as_deref() == Some(next.as_str()) {
            return Err(LedgerError::Query(format!("owned objects cursor {} repeats", next)));
        }
        cursor = Some(next);
    }

    tracing::debug!(owner, receipts = receipts.len(), "fetched vote receipts");
    Ok(receipts)
}
