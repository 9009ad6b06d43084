use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hippo_quote::shared::config::ConfigLoader;
use hippo_quote::{create_providers, InMemoryTokenRegistry, PoolManager, RestLedgerClient, TradingPool, Venue};

#[derive(Parser, Debug)]
#[command(version, about = "Swap quotes across Basiq, Econia and Hippo stable curve pools on Aptos")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the pools discovered on every venue
    Pools,
    /// Quote a swap on every pool trading the pair
    Quote {
        /// Input token symbol
        #[arg(long)]
        from: String,

        /// Output token symbol
        #[arg(long)]
        to: String,

        /// Input amount in UI units
        #[arg(long)]
        amount: f64,
    },
}

#[derive(Serialize)]
struct PoolSummary {
    id: String,
    venue: Venue,
    routable: bool,
    x: String,
    y: String,
}

impl PoolSummary {
    fn of(pool: &dyn TradingPool) -> Self {
        Self {
            id: pool.id(),
            venue: pool.venue(),
            routable: pool.is_routable(),
            x: pool.x_token().symbol.clone(),
            y: pool.y_token().symbol.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = ConfigLoader::load_config(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config))?;
    info!(network = %config.network.name, fullnode = %config.network.fullnode_url, "loaded config");

    let registry = Arc::new(InMemoryTokenRegistry::from_entries(config.tokens.clone()));
    let ledger = Arc::new(RestLedgerClient::new(&config.network.fullnode_url));
    let mut manager = PoolManager::new(create_providers(&config.network, ledger, registry.clone()));

    for (venue, error) in manager.discover_pools().await {
        warn!(venue = %venue, error = %error, "venue unavailable");
    }

    match args.command {
        Command::Pools => {
            let pools: Vec<PoolSummary> = manager.get_pools().iter().map(|p| PoolSummary::of(p.as_ref())).collect();
            println!("{}", serde_json::to_string_pretty(&pools)?);
        }
        Command::Quote { from, to, amount } => {
            let from_token = registry
                .find_by_symbol(&from)
                .ok_or_else(|| anyhow!("unknown token symbol {}", from))?;
            let to_token = registry
                .find_by_symbol(&to)
                .ok_or_else(|| anyhow!("unknown token symbol {}", to))?;

            let pools: Vec<Arc<dyn TradingPool>> = manager
                .pools_for(&from_token.token_type, &to_token.token_type)
                .into_iter()
                .map(|(pool, _)| pool)
                .collect();
            info!(pools = pools.len(), "reloading matching pools");
            PoolManager::reload_pools(&pools).await;

            let quotes = manager.quote_all(&from_token.token_type, &to_token.token_type, amount);
            if quotes.is_empty() {
                warn!(from = %from, to = %to, "no pool could quote the pair");
            }
            println!("{}", serde_json::to_string_pretty(&quotes)?);
        }
    }

    Ok(())
}
