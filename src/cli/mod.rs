use clap::{Parser, Subcommand, ValueEnum};

pub mod board;
pub mod config;
pub mod delist;
pub mod generate;
pub mod init_config;
pub mod logging;
pub mod provision;
pub mod snapshot;
pub mod status;
pub mod version;
pub mod vote;

#[derive(Parser)]
#[command(name = "dashvote")]
#[command(author = "Dashvote Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Proposal dashboard and batch provisioning CLI", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/dashvote/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Vote choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Choice {
    Yes,
    No,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a script that creates N proposals and registers them on the dashboard
    Generate {
        /// Number of proposals to create
        #[arg(long, allow_negative_numbers = true)]
        count: i64,

        /// Published package reference (overrides config)
        #[arg(long)]
        package: Option<String>,

        /// Admin capability reference (overrides config)
        #[arg(long)]
        admin_cap: Option<String>,

        /// Dashboard reference (overrides config)
        #[arg(long)]
        dashboard: Option<String>,

        /// Network from the config file (default: default_network)
        #[arg(long)]
        network: Option<String>,

        /// Seed for the title discriminators (reproducible output)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a script and execute it against the local ledger snapshot
    Provision {
        /// Number of proposals to create
        #[arg(long, allow_negative_numbers = true)]
        count: i64,

        /// Path to ledger snapshot (default: ~/.local/share/dashvote/ledger.json)
        #[arg(long)]
        snapshot: Option<String>,

        /// Address recorded as the proposals' creator
        #[arg(long, default_value = "0x0")]
        sender: String,

        /// Seed for the title discriminators
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Cast a vote on the local ledger snapshot
    Vote {
        /// Proposal reference
        #[arg(long)]
        proposal: String,

        /// Voting identity
        #[arg(long)]
        voter: String,

        /// Vote choice
        #[arg(long, value_enum)]
        choice: Choice,

        /// Path to ledger snapshot
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Delist a proposal on the local ledger snapshot
    Delist {
        /// Proposal reference
        #[arg(long)]
        proposal: String,

        /// Path to ledger snapshot
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Show proposals registered on the dashboard
    Board {
        /// Path to ledger snapshot
        #[arg(long)]
        snapshot: Option<String>,

        /// Dashboard reference (default: the snapshot's dashboard)
        #[arg(long)]
        dashboard: Option<String>,

        /// Mark proposals this identity already voted on
        #[arg(long)]
        voter: Option<String>,
    },

    /// Resolve the effective status of a proposal
    Status {
        /// Stored status: Active or Delisted
        #[arg(long, default_value = "Active")]
        status: String,

        /// Expiration instant in Unix-epoch milliseconds
        #[arg(long)]
        expiration: u64,

        /// Evaluate at this instant instead of now (Unix-epoch milliseconds)
        #[arg(long)]
        now: Option<u64>,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Record this network as the default
        #[arg(long)]
        network: Option<String>,

        /// Published package reference for the network
        #[arg(long)]
        package: Option<String>,

        /// Admin capability reference for the network
        #[arg(long)]
        admin_cap: Option<String>,

        /// Dashboard reference for the network
        #[arg(long)]
        dashboard: Option<String>,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Generate {
            count,
            package,
            admin_cap,
            dashboard,
            network,
            seed,
        } => generate::execute(cli.config, count, package, admin_cap, dashboard, network, seed),
        Commands::Provision {
            count,
            snapshot,
            sender,
            seed,
        } => provision::execute(snapshot, count, sender, seed),
        Commands::Vote {
            proposal,
            voter,
            choice,
            snapshot,
        } => vote::execute(snapshot, proposal, voter, choice),
        Commands::Delist { proposal, snapshot } => delist::execute(snapshot, proposal),
        Commands::Board {
            snapshot,
            dashboard,
            voter,
        } => board::execute(snapshot, dashboard, voter).await,
        Commands::Status {
            status,
            expiration,
            now,
        } => status::execute(status, expiration, now),
        Commands::InitConfig {
            force,
            network,
            package,
            admin_cap,
            dashboard,
        } => init_config::execute(cli.config, force, network, package, admin_cap, dashboard),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
