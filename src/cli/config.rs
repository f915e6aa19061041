//! Dashvote configuration file handling
//!
//! Configuration is TOML, stored at `<config_dir>/dashvote/config.toml` unless
//! `--config` points elsewhere. It names the deployed package, admin
//! capability and dashboard for each network the operator targets, plus
//! logging settings.
//!
//! Command-line flags always override values from this file.

use dashvote::ledger::{LedgerError, ObjectRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("No network selected: pass --network or set default_network")]
    NoNetwork,

    #[error("Invalid reference in network '{network}': {source}")]
    InvalidReference {
        network: String,
        source: LedgerError,
    },
}

/// Dashvote configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashvoteConfig {
    /// Network used when `--network` is not given
    pub default_network: Option<String>,

    /// Deployed objects per network name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployed objects on one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub package_id: String,
    pub admin_cap_id: String,
    pub dashboard_id: String,
}

/// Validated references of one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRefs {
    pub package: ObjectRef,
    pub admin_cap: ObjectRef,
    pub dashboard: ObjectRef,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl NetworkConfig {
    /// Parse the configured references.
    pub fn refs(&self, network: &str) -> Result<NetworkRefs, ConfigError> {
        let parse = |raw: &str| {
            ObjectRef::parse(raw).map_err(|source| ConfigError::InvalidReference {
                network: network.to_string(),
                source,
            })
        };

        Ok(NetworkRefs {
            package: parse(&self.package_id)?,
            admin_cap: parse(&self.admin_cap_id)?,
            dashboard: parse(&self.dashboard_id)?,
        })
    }
}

impl DashvoteConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration if the file exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_file(path, &contents)
    }

    /// Select a network by name, falling back to `default_network`
    pub fn network(&self, name: Option<&str>) -> Result<(String, &NetworkConfig), ConfigError> {
        let name = name
            .map(str::to_string)
            .or_else(|| self.default_network.clone())
            .ok_or(ConfigError::NoNetwork)?;

        let network = self
            .networks
            .get(&name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.clone()))?;

        Ok((name, network))
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# Dashvote Configuration
#
# Each [networks.<name>] table lists the objects created when the voting
# package was published on that network. Command-line flags override these.

# Network used when --network is not given
# default_network = "testnet"

# [networks.testnet]
# package_id = "0x..."
# admin_cap_id = "0x..."
# dashboard_id = "0x..."

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/dashvote/dashvote.log"
"#,
            level = DEFAULT_LOG_LEVEL
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path, force: bool) -> Result<(), ConfigError> {
        if config_path.exists() && !force {
            return Err(ConfigError::AlreadyExists(config_path.to_path_buf()));
        }
        write_file(config_path, &Self::generate_default_toml())
    }

    /// Create a configuration file holding one network, made the default
    ///
    /// The references are validated before anything is written.
    pub fn create_with_network(
        config_path: &Path,
        force: bool,
        name: &str,
        network: NetworkConfig,
    ) -> Result<(), ConfigError> {
        if config_path.exists() && !force {
            return Err(ConfigError::AlreadyExists(config_path.to_path_buf()));
        }
        network.refs(name)?;

        let mut config = Self {
            default_network: Some(name.to_string()),
            ..Self::default()
        };
        config.networks.insert(name.to_string(), network);
        config.save(config_path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the config path: `--config` if given, else the default location
pub fn resolve_config_path(config: Option<&str>) -> PathBuf {
    config.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dashvote")
        .join("config.toml")
}

/// Get the default local ledger snapshot path
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dashvote")
        .join("ledger.json")
}
