//! Aggregator registry node
//!
//! Bootstraps one registry over the configured store and exposes its
//! operations as subcommands. Every subcommand prints JSON on stdout.

use aggregator_registry::{AggregatorRegistry, RegistryStore, TracingObserver};
use aggregator_storage::{MemoryStore, SledStore};
use aggregator_types::Principal;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app_config;
mod version;

use app_config::{AppConfig, StoreKind};
use version::{git_commit_hash, AGGREGATOR_VERSION};

type NodeRegistry = AggregatorRegistry<Box<dyn RegistryStore>>;

#[derive(Parser)]
#[command(name = "aggregator-node")]
#[command(about = "Aggregator registry bootstrap and operator commands", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the configured store backend
    #[arg(long, value_enum, global = true)]
    store: Option<StoreKind>,

    /// Override the configured data directory
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instantiate the registry and report where it lives
    Deploy {
        /// Account performing the deployment
        #[arg(long)]
        deployer: Option<Principal>,
    },
    /// Register a domain for the calling principal
    Register(DescriptorArgs),
    /// Replace the DID and content pointer of an owned domain
    Update(DescriptorArgs),
    /// Look up a domain
    GetByDomain {
        domain: String,
    },
    /// Look up the domain registered by a principal
    GetByOwner {
        owner: Principal,
    },
    /// Check whether a domain is registered
    IsRegistered {
        domain: String,
    },
    /// Check whether a principal owns a domain
    IsOwner {
        candidate: Principal,
        domain: String,
    },
}

#[derive(Args)]
struct DescriptorArgs {
    /// Authenticated caller principal (0x-prefixed, 40 hex digits)
    #[arg(long)]
    caller: Principal,
    #[arg(long)]
    domain: String,
    /// Decentralized identifier, e.g. did:web:example.xyz
    #[arg(long)]
    did: String,
    /// Content-addressed hash of the current data snapshot
    #[arg(long)]
    cid: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    init_logging(&config)?;

    let registry = open_registry(&config)?;
    let output = run_command(&registry, cli.command)?;
    registry.flush().context("failed to flush registry store")?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn open_registry(config: &AppConfig) -> Result<NodeRegistry> {
    let store: Box<dyn RegistryStore> = match config.store {
        StoreKind::Memory => Box::new(MemoryStore::new()),
        StoreKind::Sled => Box::new(SledStore::new(&config.data_dir).with_context(|| {
            format!("failed to open sled store at {}", config.data_dir.display())
        })?),
    };

    let registry = AggregatorRegistry::with_store(store);
    registry.subscribe(Arc::new(TracingObserver));
    Ok(registry)
}

fn run_command(registry: &NodeRegistry, command: Commands) -> Result<serde_json::Value> {
    let output = match command {
        Commands::Deploy { deployer } => {
            if let Some(deployer) = &deployer {
                info!(%deployer, "Deploying registry with account");
            }
            let location = registry.location();
            let records = registry.len()?;
            info!(?location, records, "Aggregator registry deployed");
            json!({
                "store": location.kind(),
                "version": AGGREGATOR_VERSION,
                "commit": git_commit_hash(),
                "location": location,
                "records": records,
            })
        }
        Commands::Register(args) => {
            registry.register(&args.caller, &args.domain, &args.did, &args.cid)?;
            json!({ "events": registry.events() })
        }
        Commands::Update(args) => {
            registry.update(&args.caller, &args.domain, &args.did, &args.cid)?;
            json!({ "events": registry.events() })
        }
        Commands::GetByDomain { domain } => {
            let record = registry.get_by_domain(&domain)?;
            serde_json::to_value(record)?
        }
        Commands::GetByOwner { owner } => {
            let record = registry.get_by_owner(&owner)?;
            serde_json::to_value(record)?
        }
        Commands::IsRegistered { domain } => {
            json!({ "domain": domain, "registered": registry.is_domain_registered(&domain) })
        }
        Commands::IsOwner { candidate, domain } => {
            let owner = registry.is_owner_of_domain(&candidate, &domain);
            json!({ "candidate": candidate, "domain": domain, "owner": owner })
        }
    };
    Ok(output)
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so stdout stays machine-readable.
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
