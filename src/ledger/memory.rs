//! In-memory ledger.
//!
//! Holds proposals, dashboards and vote receipts, and applies the
//! administrative and voting operations with the same rules as the deployed
//! package. Used as the test double behind [`LedgerQuery`] and as the store
//! for offline snapshots.

use super::decode::{encode_dashboard, encode_proposal, encode_vote_nft};
use super::traits::{LedgerQuery, VOTE_NFT_STRUCT};
use super::types::{
    Dashboard, LedgerError, LedgerResult, ObjectRef, Proposal, ProposalStatus, VoteNft,
};
use crate::proposals::resolve_status;
use crate::provisioning::generator::{
    CREATE_FUNCTION, DASHBOARD_MODULE, PROPOSAL_MODULE, REGISTER_FUNCTION,
};
use crate::provisioning::{Arg, Script, Slot, Step};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Image attached to every vote receipt minted locally.
const RECEIPT_URL: &str = "https://dashvote.local/receipt.png";

/// Owned objects returned per page, matching the ledger's default limit.
const OWNED_PAGE_SIZE: usize = 50;

/// Objects created by one package deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub package: ObjectRef,
    pub admin_cap: ObjectRef,
    pub dashboard: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProposal {
    proposal: Proposal,
    /// Capability that created the proposal; registration must present it.
    admin_cap: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OwnedNft {
    owner: String,
    nft: VoteNft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerState {
    next_object: u64,
    deployment: Option<Deployment>,
    packages: HashSet<ObjectRef>,
    admin_caps: HashSet<ObjectRef>,
    dashboards: BTreeMap<ObjectRef, Dashboard>,
    proposals: BTreeMap<ObjectRef, StoredProposal>,
    vote_nfts: Vec<OwnedNft>,
}

/// Shared in-memory ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish a package: mints the package, its admin capability and the
    /// dashboard singleton. The newest deployment becomes the default.
    pub fn deploy(&self) -> Deployment {
        let mut state = self.lock();
        let deployment = Deployment {
            package: state.mint(),
            admin_cap: state.mint(),
            dashboard: state.mint(),
        };

        state.packages.insert(deployment.package.clone());
        state.admin_caps.insert(deployment.admin_cap.clone());
        state.dashboards.insert(
            deployment.dashboard.clone(),
            Dashboard {
                id: deployment.dashboard.clone(),
                proposals_ids: Vec::new(),
            },
        );
        state.deployment = Some(deployment.clone());

        tracing::info!(package = %deployment.package, dashboard = %deployment.dashboard, "deployed package");
        deployment
    }

    /// Most recent deployment, if any.
    pub fn deployment(&self) -> Option<Deployment> {
        self.lock().deployment.clone()
    }

    /// Direct read of a proposal.
    pub fn proposal(&self, id: &ObjectRef) -> Option<Proposal> {
        self.lock().proposals.get(id).map(|s| s.proposal.clone())
    }

    /// Direct read of a dashboard.
    pub fn dashboard(&self, id: &ObjectRef) -> Option<Dashboard> {
        self.lock().dashboards.get(id).cloned()
    }

    /// Create an active proposal with zero tallies.
    pub fn create_proposal(
        &self,
        admin_cap: &ObjectRef,
        title: &str,
        description: &str,
        expiration_ms: u64,
        creator: &str,
    ) -> LedgerResult<ObjectRef> {
        self.lock()
            .create_proposal(admin_cap, title, description, expiration_ms, creator)
    }

    /// Append a proposal to a dashboard.
    pub fn register_proposal(
        &self,
        dashboard: &ObjectRef,
        admin_cap: &ObjectRef,
        proposal: &ObjectRef,
    ) -> LedgerResult<()> {
        self.lock().register_proposal(dashboard, admin_cap, proposal)
    }

    /// Record a vote and mint the voter's receipt.
    pub fn cast_vote(
        &self,
        proposal: &ObjectRef,
        voter: &str,
        approve: bool,
        now_ms: u64,
    ) -> LedgerResult<VoteNft> {
        let mut state = self.lock();

        let stored = state
            .proposals
            .get_mut(proposal)
            .ok_or_else(|| LedgerError::NotFound(proposal.to_string()))?;
        let entry = &mut stored.proposal;

        let status = resolve_status(entry.status, entry.expiration_ms, now_ms);
        if !status.permits_voting() {
            return Err(LedgerError::NotVotable {
                proposal: proposal.to_string(),
                status: status.to_string(),
            });
        }

        if !entry.voter_registry.insert(voter.to_string()) {
            return Err(LedgerError::AlreadyVoted {
                proposal: proposal.to_string(),
                voter: voter.to_string(),
            });
        }

        if approve {
            entry.voted_yes_count += 1;
        } else {
            entry.voted_no_count += 1;
        }

        let nft = VoteNft {
            id: state.mint(),
            proposal_id: proposal.clone(),
            url: RECEIPT_URL.to_string(),
        };
        state.vote_nfts.push(OwnedNft {
            owner: voter.to_string(),
            nft: nft.clone(),
        });

        tracing::info!(proposal = %proposal, approve, "vote recorded");
        Ok(nft)
    }

    /// Retire a proposal. Only its creating capability may do so.
    pub fn delist(&self, proposal: &ObjectRef, admin_cap: &ObjectRef) -> LedgerResult<()> {
        let mut state = self.lock();
        let stored = state
            .proposals
            .get_mut(proposal)
            .ok_or_else(|| LedgerError::NotFound(proposal.to_string()))?;

        if &stored.admin_cap != admin_cap {
            return Err(LedgerError::Unauthorized(format!(
                "{} did not create proposal {}",
                admin_cap, proposal
            )));
        }

        stored.proposal.status = ProposalStatus::Delisted;
        tracing::info!(proposal = %proposal, "proposal delisted");
        Ok(())
    }

    /// Execute a provisioning script atomically.
    ///
    /// Steps run in order on a scratch copy of the state; slot arguments
    /// resolve to the objects produced by earlier steps. Nothing is committed
    /// unless every step succeeds. Returns the created proposals in order.
    pub fn execute_script(&self, script: &Script, sender: &str) -> LedgerResult<Vec<ObjectRef>> {
        let mut guard = self.lock();
        let mut scratch = guard.clone();
        let mut bindings: HashMap<Slot, ObjectRef> = HashMap::new();
        let mut created = Vec::new();

        for (index, step) in script.steps().iter().enumerate() {
            if !scratch.packages.contains(&step.target.package) {
                return Err(LedgerError::NotFound(format!(
                    "step {}: package {}",
                    index, step.target.package
                )));
            }

            let call = (step.target.module.as_str(), step.target.function.as_str());
            let produced = match call {
                (PROPOSAL_MODULE, CREATE_FUNCTION) => {
                    let [cap, title, description, expiration] = step_args::<4>(step, index)?;
                    let id = scratch.create_proposal(
                        &object_arg(cap, &bindings, index)?,
                        str_arg(title, index)?,
                        str_arg(description, index)?,
                        u64_arg(expiration, index)?,
                        sender,
                    )?;
                    created.push(id.clone());
                    Some(id)
                }
                (DASHBOARD_MODULE, REGISTER_FUNCTION) => {
                    let [dashboard, cap, proposal] = step_args::<3>(step, index)?;
                    scratch.register_proposal(
                        &object_arg(dashboard, &bindings, index)?,
                        &object_arg(cap, &bindings, index)?,
                        &object_arg(proposal, &bindings, index)?,
                    )?;
                    None
                }
                _ => {
                    return Err(LedgerError::InvalidArgument(format!(
                        "step {}: unknown entry point {}",
                        index, step.target
                    )));
                }
            };

            if let Some(slot) = &step.assign {
                let value = produced.ok_or_else(|| {
                    LedgerError::InvalidArgument(format!(
                        "step {}: {} returns nothing to assign",
                        index, step.target
                    ))
                })?;
                bindings.insert(slot.clone(), value);
            }
        }

        *guard = scratch;
        tracing::info!(steps = script.len(), created = created.len(), "script executed");
        Ok(created)
    }

    /// Load a snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: &Path) -> LedgerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Snapshot(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let state: LedgerState = serde_json::from_str(&contents).map_err(|e| {
            LedgerError::Snapshot(format!("failed to parse '{}': {}", path.display(), e))
        })?;

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Write the full ledger state as JSON.
    pub fn save_snapshot(&self, path: &Path) -> LedgerResult<()> {
        let contents = serde_json::to_string_pretty(&*self.lock())
            .map_err(|e| LedgerError::Snapshot(format!("failed to serialize: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LedgerError::Snapshot(format!("failed to create '{}': {}", parent.display(), e))
            })?;
        }

        fs::write(path, contents).map_err(|e| {
            LedgerError::Snapshot(format!("failed to write '{}': {}", path.display(), e))
        })
    }
}

impl LedgerState {
    fn mint(&mut self) -> ObjectRef {
        self.next_object += 1;
        ObjectRef::from_counter(self.next_object)
    }

    fn create_proposal(
        &mut self,
        admin_cap: &ObjectRef,
        title: &str,
        description: &str,
        expiration_ms: u64,
        creator: &str,
    ) -> LedgerResult<ObjectRef> {
        if !self.admin_caps.contains(admin_cap) {
            return Err(LedgerError::Unauthorized(format!(
                "{} is not an admin capability",
                admin_cap
            )));
        }

        let id = self.mint();
        let proposal = Proposal {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            status: ProposalStatus::Active,
            voted_yes_count: 0,
            voted_no_count: 0,
            expiration_ms,
            creator: creator.to_string(),
            voter_registry: HashSet::new(),
        };
        self.proposals.insert(
            id.clone(),
            StoredProposal {
                proposal,
                admin_cap: admin_cap.clone(),
            },
        );

        tracing::debug!(proposal = %id, expiration_ms, "proposal created");
        Ok(id)
    }

    fn register_proposal(
        &mut self,
        dashboard: &ObjectRef,
        admin_cap: &ObjectRef,
        proposal: &ObjectRef,
    ) -> LedgerResult<()> {
        let stored = self
            .proposals
            .get(proposal)
            .ok_or_else(|| LedgerError::NotFound(format!("proposal {}", proposal)))?;

        if &stored.admin_cap != admin_cap {
            return Err(LedgerError::Unauthorized(format!(
                "{} did not create proposal {}",
                admin_cap, proposal
            )));
        }

        if self
            .dashboards
            .values()
            .any(|d| d.proposals_ids.contains(proposal))
        {
            return Err(LedgerError::InvalidArgument(format!(
                "proposal {} is already registered",
                proposal
            )));
        }

        let board = self
            .dashboards
            .get_mut(dashboard)
            .ok_or_else(|| LedgerError::NotFound(format!("dashboard {}", dashboard)))?;
        board.proposals_ids.push(proposal.clone());

        tracing::debug!(proposal = %proposal, dashboard = %dashboard, "proposal registered");
        Ok(())
    }
}

fn step_args<const N: usize>(step: &Step, index: usize) -> LedgerResult<[&Arg; N]> {
    let args: Vec<&Arg> = step.args.iter().collect();
    args.try_into().map_err(|args: Vec<&Arg>| {
        LedgerError::InvalidArgument(format!(
            "step {}: {} expects {} arguments, got {}",
            index,
            step.target,
            N,
            args.len()
        ))
    })
}

fn object_arg(
    arg: &Arg,
    bindings: &HashMap<Slot, ObjectRef>,
    index: usize,
) -> LedgerResult<ObjectRef> {
    match arg {
        Arg::Object(r) => Ok(r.clone()),
        Arg::Slot(slot) => bindings.get(slot).cloned().ok_or_else(|| {
            LedgerError::InvalidArgument(format!("step {}: slot {} is unbound", index, slot))
        }),
        other => Err(LedgerError::InvalidArgument(format!(
            "step {}: expected an object, got {}",
            index, other
        ))),
    }
}

fn str_arg(arg: &Arg, index: usize) -> LedgerResult<&str> {
    match arg {
        Arg::Str(s) => Ok(s),
        other => Err(LedgerError::InvalidArgument(format!(
            "step {}: expected a string, got {}",
            index, other
        ))),
    }
}

fn u64_arg(arg: &Arg, index: usize) -> LedgerResult<u64> {
    match arg {
        Arg::U64(n) => Ok(*n),
        other => Err(LedgerError::InvalidArgument(format!(
            "step {}: expected a u64, got {}",
            index, other
        ))),
    }
}

#[async_trait]
impl LedgerQuery for MemoryLedger {
    async fn get_object(&self, id: &ObjectRef) -> LedgerResult<Option<Value>> {
        let state = self.lock();

        if let Some(stored) = state.proposals.get(id) {
            return Ok(Some(encode_proposal(&stored.proposal)));
        }
        if let Some(dashboard) = state.dashboards.get(id) {
            return Ok(Some(encode_dashboard(dashboard)));
        }
        if let Some(owned) = state.vote_nfts.iter().find(|o| &o.nft.id == id) {
            return Ok(Some(encode_vote_nft(&owned.nft)));
        }
        if state.packages.contains(id) {
            return Ok(Some(json!({
                "objectId": id.as_str(),
                "content": { "dataType": "package" }
            })));
        }
        Ok(None)
    }

    async fn owned_objects(
        &self,
        owner: &str,
        struct_type: &str,
        cursor: Option<&str>,
    ) -> LedgerResult<Value> {
        let start = match cursor {
            None => 0,
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| LedgerError::InvalidArgument(format!("bad cursor: {:?}", raw)))?,
        };

        let state = self.lock();
        let owned: Vec<&OwnedNft> = if struct_type.ends_with(VOTE_NFT_STRUCT) {
            state.vote_nfts.iter().filter(|o| o.owner == owner).collect()
        } else {
            Vec::new()
        };

        let end = owned.len().min(start.saturating_add(OWNED_PAGE_SIZE));
        let data: Vec<Value> = owned
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|o| json!({ "data": encode_vote_nft(&o.nft) }))
            .collect();

        let has_next = end < owned.len();
        let next_cursor = has_next.then(|| end.to_string());
        Ok(json!({
            "data": data,
            "hasNextPage": has_next,
            "nextCursor": next_cursor,
        }))
    }
}
