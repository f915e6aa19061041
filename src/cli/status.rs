use dashvote::clock::{Clock, SystemClock};
use dashvote::ledger::ProposalStatus;
use dashvote::proposals::{format_deadline, format_remaining, resolve_status};

/// Resolve the effective status of a proposal from its raw fields
///
/// `now` defaults to the system clock; pass `--now` to evaluate at a fixed
/// instant.
pub fn execute(
    status: String,
    expiration: u64,
    now: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw: ProposalStatus = status.parse()?;
    let now = now.unwrap_or_else(|| SystemClock.now_ms());
    let effective = resolve_status(raw, expiration, now);

    println!("Status:   {}", effective);
    println!("Deadline: {}", format_deadline(effective, expiration));
    if let Some(remaining) = format_remaining(expiration, now).filter(|_| effective.permits_voting())
    {
        println!("Closes:   in {}", remaining);
    }
    println!(
        "Voting:   {}",
        if effective.permits_voting() { "open" } else { "closed" }
    );
    Ok(())
}
