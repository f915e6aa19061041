//! Typed provisioning script.
//!
//! A script is an ordered list of Move calls executed atomically by the ledger.
//! A step may bind its result to a named slot, and later steps may pass that
//! slot as an argument. [`ScriptBuilder::build`] rejects any script where a
//! slot is read before an earlier step bound it, or where a slot is bound twice.

use super::{ProvisionError, ProvisionResult};
use crate::ledger::ObjectRef;
use std::collections::HashSet;
use std::fmt;

/// Leading command of a rendered script.
pub const PTB_COMMAND: &str = "sui client ptb";

/// Line continuation used between rendered script fragments.
const CONTINUATION: &str = " \\\n  ";

/// Script-local name for a step result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot(String);

impl Slot {
    /// Validate a slot name: ASCII lowercase letter first, then `[a-z0-9_]`.
    pub fn new(name: &str) -> ProvisionResult<Self> {
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_lowercase())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if !valid {
            return Err(ProvisionError::InvalidArgument(format!(
                "invalid slot name: {:?}",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Slot holding the proposal created in batch iteration `i`.
    pub fn for_proposal(i: u64) -> Self {
        Self(format!("proposal_id_{}", i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully qualified Move entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    pub package: ObjectRef,
    pub module: String,
    pub function: String,
}

impl MoveTarget {
    pub fn new(package: &ObjectRef, module: &str, function: &str) -> Self {
        Self {
            package: package.clone(),
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Argument to a Move call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Existing ledger object.
    Object(ObjectRef),
    /// String literal.
    Str(String),
    U64(u64),
    /// Result of an earlier step.
    Slot(Slot),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(r) => write!(f, "@{}", r),
            Self::Str(s) => write!(f, "'\"{}\"'", s),
            Self::U64(n) => write!(f, "{}", n),
            Self::Slot(slot) => write!(f, "{}", slot),
        }
    }
}

/// One Move call, optionally binding its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub target: MoveTarget,
    pub args: Vec<Arg>,
    pub assign: Option<Slot>,
}

impl Step {
    pub fn call(target: MoveTarget, args: Vec<Arg>) -> Self {
        Self {
            target,
            args,
            assign: None,
        }
    }

    /// Bind the call result to `slot`.
    pub fn assign(mut self, slot: Slot) -> Self {
        self.assign = Some(slot);
        self
    }

    /// Slots this step reads.
    pub fn consumes(&self) -> impl Iterator<Item = &Slot> {
        self.args.iter().filter_map(|arg| match arg {
            Arg::Slot(slot) => Some(slot),
            _ => None,
        })
    }

    /// Slot this step binds, if any.
    pub fn produces(&self) -> Option<&Slot> {
        self.assign.as_ref()
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(CONTINUATION);
        out.push_str("--move-call ");
        out.push_str(&self.target.to_string());

        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(Arg::to_string).collect();
            out.push_str(CONTINUATION);
            out.push_str(&args.join(" "));
        }

        if let Some(slot) = &self.assign {
            out.push_str(CONTINUATION);
            out.push_str("--assign ");
            out.push_str(slot.as_str());
        }
    }
}

/// Accumulates steps; [`build`](Self::build) checks the slot chain.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    steps: Vec<Step>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Validate and seal the script.
    ///
    /// Every consumed slot must be bound by a strictly earlier step, no slot
    /// may be bound twice, and string literals must be quotable.
    pub fn build(self) -> ProvisionResult<Script> {
        let mut bound: HashSet<&Slot> = HashSet::new();

        for (index, step) in self.steps.iter().enumerate() {
            for slot in step.consumes() {
                if !bound.contains(slot) {
                    return Err(ProvisionError::UnboundSlot {
                        step: index,
                        slot: slot.to_string(),
                    });
                }
            }

            for arg in &step.args {
                if let Arg::Str(s) = arg {
                    if s.contains(['\'', '"', '\\', '\n']) {
                        return Err(ProvisionError::InvalidArgument(format!(
                            "step {}: string literal cannot be quoted: {:?}",
                            index, s
                        )));
                    }
                }
            }

            if let Some(slot) = step.produces() {
                if !bound.insert(slot) {
                    return Err(ProvisionError::DuplicateSlot {
                        step: index,
                        slot: slot.to_string(),
                    });
                }
            }
        }

        Ok(Script { steps: self.steps })
    }
}

/// A validated, dependency-ordered script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render as a single ledger-client command.
    pub fn render(&self) -> String {
        let mut out = String::from(PTB_COMMAND);
        for step in &self.steps {
            step.render_into(&mut out);
        }
        out
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
