//! Raw ledger payload decoding.
//!
//! The query client returns objects as JSON:
//!
//! ```text
//! { "objectId": "0x..", "content": { "dataType": "moveObject", "fields": { .. } } }
//! ```
//!
//! A missing payload or a non-Move-object payload decodes to `NotFound`. A Move
//! object whose fields have the wrong shape decodes to `DecodeMismatch` naming
//! the offending field. Nothing is trusted without a check.

use super::types::{
    Dashboard, LedgerError, LedgerResult, ObjectRef, Proposal, ProposalStatus, VoteNft,
};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

const MOVE_OBJECT: &str = "moveObject";

type Fields = Map<String, Value>;

/// Extract the Move struct fields of an object payload.
pub fn move_fields(data: Option<&Value>) -> LedgerResult<&Fields> {
    let data = match data {
        None | Some(Value::Null) => {
            return Err(LedgerError::NotFound("empty payload".to_string()));
        }
        Some(data) => data,
    };

    let content = data
        .get("content")
        .ok_or_else(|| LedgerError::NotFound("payload has no content".to_string()))?;

    match content.get("dataType").and_then(Value::as_str) {
        Some(MOVE_OBJECT) => {}
        other => {
            return Err(LedgerError::NotFound(format!(
                "payload is not a Move object (dataType = {:?})",
                other
            )));
        }
    }

    content
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| LedgerError::DecodeMismatch("content.fields is not an object".to_string()))
}

/// Decode a proposal object.
pub fn decode_proposal(data: Option<&Value>) -> LedgerResult<Proposal> {
    let fields = move_fields(data)?;

    let voted_yes_count = u64_field(fields, "voted_yes_count")?;
    let voted_no_count = u64_field(fields, "voted_no_count")?;
    let voter_registry = voter_registry(fields)?;

    let proposal = Proposal {
        id: uid_field(fields, "id")?,
        title: str_field(fields, "title")?.to_string(),
        description: str_field(fields, "description")?.to_string(),
        status: status_field(fields, "status")?,
        voted_yes_count,
        voted_no_count,
        expiration_ms: u64_field(fields, "expiration")?,
        creator: str_field(fields, "creator")?.to_string(),
        voter_registry,
    };

    if !proposal.tally_is_consistent() {
        return Err(LedgerError::DecodeMismatch(format!(
            "tallies ({} yes + {} no) disagree with {} registered voters",
            proposal.voted_yes_count,
            proposal.voted_no_count,
            proposal.voter_registry.len()
        )));
    }

    Ok(proposal)
}

/// Decode the dashboard object. Duplicate proposal ids are rejected.
pub fn decode_dashboard(data: Option<&Value>) -> LedgerResult<Dashboard> {
    let fields = move_fields(data)?;
    let id = uid_field(fields, "id")?;

    let raw_ids = fields
        .get("proposals_ids")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch("proposals_ids", "expected an array"))?;

    let mut seen = HashSet::with_capacity(raw_ids.len());
    let mut proposals_ids = Vec::with_capacity(raw_ids.len());
    for raw in raw_ids {
        let proposal_id = ref_value(raw, "proposals_ids")?;
        if !seen.insert(proposal_id.clone()) {
            return Err(mismatch(
                "proposals_ids",
                &format!("duplicate proposal id {}", proposal_id),
            ));
        }
        proposals_ids.push(proposal_id);
    }

    Ok(Dashboard { id, proposals_ids })
}

/// Decode a single vote receipt.
pub fn decode_vote_nft(data: Option<&Value>) -> LedgerResult<VoteNft> {
    let fields = move_fields(data)?;
    Ok(VoteNft {
        id: uid_field(fields, "id")?,
        proposal_id: ref_value(
            fields
                .get("proposal_id")
                .ok_or_else(|| mismatch("proposal_id", "missing"))?,
            "proposal_id",
        )?,
        url: str_field(fields, "url")?.to_string(),
    })
}

/// Extract vote receipts from a paginated owned-objects response.
///
/// Entries that are not decodable receipts are skipped.
pub fn extract_vote_nfts(page: &Value) -> Vec<VoteNft> {
    let Some(entries) = page.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match decode_vote_nft(entry.get("data")) {
            Ok(nft) => Some(nft),
            Err(e) => {
                tracing::debug!(error = %e, "skipping owned object that is not a vote receipt");
                None
            }
        })
        .collect()
}

/// Encode a proposal the way the ledger serves it.
pub fn encode_proposal(proposal: &Proposal) -> Value {
    let mut voters: Vec<&String> = proposal.voter_registry.iter().collect();
    voters.sort();
    move_object(
        &proposal.id,
        json!({
            "id": { "id": proposal.id.as_str() },
            "title": proposal.title,
            "description": proposal.description,
            "status": { "variant": proposal.status.as_str(), "fields": {} },
            "voted_yes_count": proposal.voted_yes_count.to_string(),
            "voted_no_count": proposal.voted_no_count.to_string(),
            "expiration": proposal.expiration_ms.to_string(),
            "creator": proposal.creator,
            "voter_registry": voters,
        }),
    )
}

/// Encode a dashboard the way the ledger serves it.
pub fn encode_dashboard(dashboard: &Dashboard) -> Value {
    let ids: Vec<&str> = dashboard.proposals_ids.iter().map(ObjectRef::as_str).collect();
    move_object(
        &dashboard.id,
        json!({
            "id": { "id": dashboard.id.as_str() },
            "proposals_ids": ids,
        }),
    )
}

/// Encode a vote receipt the way the ledger serves it.
pub fn encode_vote_nft(nft: &VoteNft) -> Value {
    move_object(
        &nft.id,
        json!({
            "id": { "id": nft.id.as_str() },
            "proposal_id": nft.proposal_id.as_str(),
            "url": nft.url,
        }),
    )
}

fn move_object(id: &ObjectRef, fields: Value) -> Value {
    json!({
        "objectId": id.as_str(),
        "content": {
            "dataType": MOVE_OBJECT,
            "fields": fields,
        }
    })
}

fn mismatch(field: &str, detail: &str) -> LedgerError {
    LedgerError::DecodeMismatch(format!("field `{}`: {}", field, detail))
}

fn str_field<'a>(fields: &'a Fields, name: &str) -> LedgerResult<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(name, "expected a string"))
}

/// The ledger serializes u64 as decimal strings; plain numbers are accepted too.
fn u64_field(fields: &Fields, name: &str) -> LedgerResult<u64> {
    match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| mismatch(name, "expected a non-negative integer")),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| mismatch(name, &format!("not a u64: {:?}", s))),
        _ => Err(mismatch(name, "expected a u64")),
    }
}

/// UIDs appear either as a bare string or as `{ "id": "0x.." }`.
fn uid_field(fields: &Fields, name: &str) -> LedgerResult<ObjectRef> {
    let value = fields.get(name).ok_or_else(|| mismatch(name, "missing"))?;
    let inner = match value {
        Value::Object(map) => map.get("id").unwrap_or(&Value::Null),
        other => other,
    };
    ref_value(inner, name)
}

fn ref_value(value: &Value, name: &str) -> LedgerResult<ObjectRef> {
    let raw = value
        .as_str()
        .ok_or_else(|| mismatch(name, "expected a reference string"))?;
    ObjectRef::parse(raw).map_err(|e| mismatch(name, &e.to_string()))
}

fn status_field(fields: &Fields, name: &str) -> LedgerResult<ProposalStatus> {
    let variant = fields
        .get(name)
        .and_then(|v| v.get("variant"))
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(name, "expected { variant: .. }"))?;

    variant
        .parse()
        .map_err(|_| mismatch(name, &format!("unknown variant {:?}", variant)))
}

/// The registry is a plain array, a `{ contents }` set, or a wrapped set struct.
fn voter_registry(fields: &Fields) -> LedgerResult<HashSet<String>> {
    const NAME: &str = "voter_registry";
    let value = fields.get(NAME).ok_or_else(|| mismatch(NAME, "missing"))?;

    let entries = value
        .as_array()
        .or_else(|| value.get("contents").and_then(Value::as_array))
        .or_else(|| {
            value
                .get("fields")
                .and_then(|f| f.get("contents"))
                .and_then(Value::as_array)
        })
        .ok_or_else(|| mismatch(NAME, "expected a set of voters"))?;

    let mut registry = HashSet::with_capacity(entries.len());
    for entry in entries {
        let voter = entry
            .as_str()
            .ok_or_else(|| mismatch(NAME, "voter is not a string"))?;
        if !registry.insert(voter.to_string()) {
            return Err(mismatch(NAME, &format!("voter {} appears twice", voter)));
        }
    }
    Ok(registry)
}
