use super::generate::build_script;
use super::snapshot::{deployment, open_or_deploy, resolve_snapshot_path};
use dashvote::clock::SystemClock;
use dashvote::provisioning::GeneratorParams;

/// Generate a provisioning script and execute it against the local ledger
///
/// The snapshot's deployment supplies the package, admin capability and
/// dashboard. A missing snapshot is created with a fresh deployment. The
/// script runs atomically: on failure nothing is written back.
pub fn execute(
    snapshot: Option<String>,
    count: i64,
    sender: String,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_snapshot_path(snapshot);
    let ledger = open_or_deploy(&path)?;
    let deployment = deployment(&ledger)?;

    let params = GeneratorParams {
        package: deployment.package,
        admin_cap: deployment.admin_cap,
        dashboard: deployment.dashboard,
        count,
    };
    let script = build_script(&params, &SystemClock, seed)?;
    let created = ledger.execute_script(&script, &sender)?;
    ledger.save_snapshot(&path)?;

    println!("✅ Created and registered {} proposal(s)", created.len());
    for id in &created {
        println!("   {}", id);
    }
    println!("   Snapshot: {}", path.display());
    Ok(())
}
