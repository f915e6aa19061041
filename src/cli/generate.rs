use super::config::{resolve_config_path, DashvoteConfig};
use dashvote::clock::{Clock, SystemClock};
use dashvote::ledger::ObjectRef;
use dashvote::provisioning::{generate, GeneratorParams, Script};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Print a provisioning script for `count` proposals
///
/// References come from the selected network in the config file; any of
/// `--package`, `--admin-cap` or `--dashboard` overrides the configured value.
/// When all three flags are given the config file is not needed.
///
/// The script is written to stdout so it can be piped to a shell.
pub fn execute(
    config_path: Option<String>,
    count: i64,
    package: Option<String>,
    admin_cap: Option<String>,
    dashboard: Option<String>,
    network: Option<String>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(
        config_path.as_deref(),
        count,
        package,
        admin_cap,
        dashboard,
        network.as_deref(),
    )?;

    let script = build_script(&params, &SystemClock, seed)?;
    println!("{}", script.render());
    Ok(())
}

/// Generate with a seeded or thread-local RNG
pub fn build_script<C: Clock>(
    params: &GeneratorParams,
    clock: &C,
    seed: Option<u64>,
) -> Result<Script, Box<dyn std::error::Error>> {
    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    Ok(generate(params, clock, &mut *rng)?)
}

/// Merge flags over the configured network
fn resolve_params(
    config_path: Option<&str>,
    count: i64,
    package: Option<String>,
    admin_cap: Option<String>,
    dashboard: Option<String>,
    network: Option<&str>,
) -> Result<GeneratorParams, Box<dyn std::error::Error>> {
    if let (Some(package), Some(admin_cap), Some(dashboard)) = (&package, &admin_cap, &dashboard) {
        return Ok(GeneratorParams::parse(package, admin_cap, dashboard, count)?);
    }

    let path = resolve_config_path(config_path);
    let config = DashvoteConfig::load_or_default(&path)?;
    let (name, selected) = config.network(network).map_err(|e| {
        format!(
            "{} (config: {}). Pass --package, --admin-cap and --dashboard instead.",
            e,
            path.display()
        )
    })?;
    let refs = selected.refs(&name)?;
    tracing::debug!(network = %name, "using configured network");

    let pick = |flag: Option<String>, configured: ObjectRef| match flag {
        Some(raw) => ObjectRef::parse(&raw),
        None => Ok(configured),
    };

    Ok(GeneratorParams {
        package: pick(package, refs.package)?,
        admin_cap: pick(admin_cap, refs.admin_cap)?,
        dashboard: pick(dashboard, refs.dashboard)?,
        count,
    })
}
