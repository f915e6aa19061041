//! Dashboard board: one card per registered proposal.
//!
//! Cards follow the dashboard's `proposals_ids` order and are keyed by
//! proposal id. A proposal that cannot be decoded becomes an unavailable card
//! instead of failing the whole board.

use super::status::{format_deadline, format_remaining, EffectiveStatus};
use crate::ledger::{fetch_proposal, Dashboard, LedgerQuery, ObjectRef, Proposal, VoteNft};
use futures::future::join_all;
use std::fmt::Write;

/// Rendered view of a decoded proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub description: String,
    pub yes: u64,
    pub no: u64,
    pub status: EffectiveStatus,
    /// Deadline text, or the status name once closed.
    pub deadline: String,
    pub remaining: Option<String>,
    pub votable: bool,
}

/// Card content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Ready(CardView),
    /// Missing or malformed payload.
    Unavailable(String),
    /// Query failure.
    Error(String),
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalCard {
    pub key: ObjectRef,
    pub body: CardBody,
    /// The viewer's receipt for this proposal, if they voted.
    pub receipt: Option<VoteNft>,
}

impl ProposalCard {
    pub fn has_voted(&self) -> bool {
        self.receipt.is_some()
    }

    /// Voting is offered only on active proposals the viewer has not voted on.
    pub fn can_vote(&self) -> bool {
        !self.has_voted() && matches!(&self.body, CardBody::Ready(view) if view.votable)
    }
}

/// Build the view for a decoded proposal at `now_ms`.
pub fn card_view(proposal: &Proposal, now_ms: u64) -> CardView {
    let status = proposal.effective_status(now_ms);
    CardView {
        title: proposal.title.clone(),
        description: proposal.description.clone(),
        yes: proposal.voted_yes_count,
        no: proposal.voted_no_count,
        status,
        deadline: format_deadline(status, proposal.expiration_ms),
        remaining: match status {
            EffectiveStatus::Active => format_remaining(proposal.expiration_ms, now_ms),
            _ => None,
        },
        votable: status.permits_voting(),
    }
}

/// Fetch every registered proposal and build the board.
///
/// Proposals are fetched concurrently; the output keeps dashboard order.
pub async fn build_board<Q>(
    query: &Q,
    dashboard: &Dashboard,
    receipts: &[VoteNft],
    now_ms: u64,
) -> Vec<ProposalCard>
where
    Q: LedgerQuery + ?Sized,
{
    let fetches = dashboard
        .proposals_ids
        .iter()
        .map(|id| fetch_proposal(query, id));
    let results = join_all(fetches).await;

    dashboard
        .proposals_ids
        .iter()
        .zip(results)
        .map(|(id, result)| {
            let body = match result {
                Ok(proposal) => CardBody::Ready(card_view(&proposal, now_ms)),
                Err(e) if e.is_unrenderable() => {
                    tracing::warn!(proposal = %id, error = %e, "proposal cannot be rendered");
                    CardBody::Unavailable(e.to_string())
                }
                Err(e) => {
                    tracing::warn!(proposal = %id, error = %e, "failed to fetch proposal");
                    CardBody::Error(e.to_string())
                }
            };

            ProposalCard {
                key: id.clone(),
                body,
                receipt: receipts.iter().find(|nft| &nft.proposal_id == id).cloned(),
            }
        })
        .collect()
}

/// Plain-text rendering of the board.
pub fn render_board(cards: &[ProposalCard]) -> String {
    if cards.is_empty() {
        return "No proposals registered.\n".to_string();
    }

    let mut out = String::new();
    for card in cards {
        match &card.body {
            CardBody::Ready(view) => {
                let voted = if card.has_voted() { "  [voted]" } else { "" };
                let _ = writeln!(out, "{}{}", view.title, voted);
                let _ = writeln!(out, "  {}", view.description);
                let _ = write!(out, "  yes {}  no {}  {}", view.yes, view.no, view.deadline);
                if let Some(remaining) = &view.remaining {
                    let _ = write!(out, " (in {})", remaining);
                }
                let _ = writeln!(out);
            }
            CardBody::Unavailable(reason) => {
                let _ = writeln!(out, "{}  unavailable: {}", card.key, reason);
            }
            CardBody::Error(reason) => {
                let _ = writeln!(out, "{}  error: {}", card.key, reason);
            }
        }
        let _ = writeln!(out, "  id {}", card.key);
    }
    out
}
