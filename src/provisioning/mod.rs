//! Batch provisioning of proposals.
//!
//! - `script`: typed steps, slot checking, rendering
//! - `generator`: create/register pairs for N proposals

pub mod generator;
pub mod script;

#[cfg(test)]
mod proptests;

use crate::ledger::LedgerError;

pub use generator::{generate, GeneratorParams};
pub use script::{Arg, MoveTarget, Script, ScriptBuilder, Slot, Step};

/// Result type for provisioning.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Provisioning errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Step {step} reads slot `{slot}` before any earlier step binds it")]
    UnboundSlot { step: usize, slot: String },

    #[error("Step {step} binds slot `{slot}` a second time")]
    DuplicateSlot { step: usize, slot: String },
}

impl From<LedgerError> for ProvisionError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}
