//! Pool manager: discovery across venues, state reloads and quote collection

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::PoolProvider;
use crate::domain::dex::{TradingPool, Venue};
use crate::shared::errors::{DiscoveryError, QuoteError};
use crate::shared::move_types::TokenType;
use crate::shared::types::QuoteType;

/// A quote tagged with the pool that produced it
#[derive(Debug, Clone, Serialize)]
pub struct PoolQuote {
    pub pool_id: String,
    pub venue: Venue,
    pub quote: QuoteType,
}

/// Manages the pools of every registered venue
pub struct PoolManager {
    providers: Vec<Arc<dyn PoolProvider>>,
    pools: Vec<Arc<dyn TradingPool>>,
}

impl PoolManager {
    pub fn new(providers: Vec<Arc<dyn PoolProvider>>) -> Self {
        Self {
            providers,
            pools: Vec::new(),
        }
    }

    pub fn get_pools(&self) -> &[Arc<dyn TradingPool>] {
        &self.pools
    }

    /// Rediscover pools on every venue concurrently, replacing the current list
    ///
    /// A venue that fails discovery is left out and its error returned
    /// alongside; the other venues still contribute their pools.
    pub async fn discover_pools(&mut self) -> Vec<(Venue, DiscoveryError)> {
        let results = join_all(self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            async move { (provider.venue(), provider.load_pool_list().await) }
        }))
        .await;

        let mut pools = Vec::new();
        let mut failures = Vec::new();
        for (venue, result) in results {
            match result {
                Ok(found) => {
                    info!(venue = %venue, count = found.len(), "discovered pools");
                    pools.extend(found);
                }
                Err(e) => {
                    warn!(venue = %venue, error = %e, "pool discovery failed");
                    failures.push((venue, e));
                }
            }
        }
        self.pools = pools;
        failures
    }

    /// Pools trading `from` into `to`, with the swap direction for each
    pub fn pools_for(&self, from: &TokenType, to: &TokenType) -> Vec<(Arc<dyn TradingPool>, bool)> {
        self.pools
            .iter()
            .filter_map(|pool| pool.direction(from, to).map(|is_x_to_y| (Arc::clone(pool), is_x_to_y)))
            .collect()
    }

    /// Reload the given pools concurrently; returns the pools that failed
    pub async fn reload_pools(pools: &[Arc<dyn TradingPool>]) -> Vec<(String, QuoteError)> {
        let results = join_all(pools.iter().map(|pool| async move { (pool.id(), pool.reload_state().await) })).await;
        results
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(()) => None,
                Err(e) => {
                    warn!(pool = %id, error = %e, "state reload failed");
                    Some((id, e))
                }
            })
            .collect()
    }

    /// Reload every known pool
    pub async fn reload_all(&self) -> Vec<(String, QuoteError)> {
        Self::reload_pools(&self.pools).await
    }

    /// Quote `input_ui_amt` of `from` into `to` on every pool trading the pair
    ///
    /// Pools that error (unloaded, no liquidity, ...) are skipped.
    pub fn quote_all(&self, from: &TokenType, to: &TokenType, input_ui_amt: f64) -> Vec<PoolQuote> {
        self.pools_for(from, to)
            .into_iter()
            .filter_map(|(pool, is_x_to_y)| match pool.get_quote(input_ui_amt, is_x_to_y) {
                Ok(quote) => Some(PoolQuote {
                    pool_id: pool.id(),
                    venue: pool.venue(),
                    quote,
                }),
                Err(e) => {
                    debug!(pool = %pool.id(), error = %e, "skipping pool");
                    None
                }
            })
            .collect()
    }
}
