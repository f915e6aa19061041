//! Proposal lifecycle and board rendering.
//!
//! Status is derived, never stored: a proposal that was active a second ago
//! may be expired now without any ledger mutation.

pub mod board;
pub mod status;

#[cfg(test)]
mod proptests;

pub use board::{build_board, card_view, render_board, CardBody, CardView, ProposalCard};
pub use status::{format_deadline, format_remaining, resolve_status, EffectiveStatus};
