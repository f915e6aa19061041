use super::config::{resolve_config_path, DashvoteConfig, NetworkConfig};

/// Write a configuration file
///
/// Without network flags this writes the commented default template. With
/// `--network`, `--package`, `--admin-cap` and `--dashboard` it records that
/// deployment and makes it the default network.
pub fn execute(
    config_path: Option<String>,
    force: bool,
    network: Option<String>,
    package: Option<String>,
    admin_cap: Option<String>,
    dashboard: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_config_path(config_path.as_deref());

    match (network, package, admin_cap, dashboard) {
        (None, None, None, None) => {
            DashvoteConfig::create_default(&path, force)?;
            println!("📝 Created: {}", path.display());
            println!("   Add a [networks.<name>] table for each deployment you target.");
        }
        (Some(name), Some(package_id), Some(admin_cap_id), Some(dashboard_id)) => {
            let network = NetworkConfig {
                package_id,
                admin_cap_id,
                dashboard_id,
            };
            DashvoteConfig::create_with_network(&path, force, &name, network)?;
            println!("📝 Created: {}", path.display());
            println!("   Default network: {}", name);
        }
        _ => {
            return Err(
                "--network, --package, --admin-cap and --dashboard must be given together".into(),
            );
        }
    }

    Ok(())
}
