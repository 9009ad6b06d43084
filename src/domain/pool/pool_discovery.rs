//! Pool discovery contract

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::dex::{TradingPool, Venue};
use crate::shared::errors::DiscoveryError;

/// Enumerates the pools of one venue
///
/// Each call returns a fresh list of unloaded pools. Pools whose tokens are
/// missing from the token registry are skipped, not reported as errors.
#[async_trait]
pub trait PoolProvider: Send + Sync {
    fn venue(&self) -> Venue;

    async fn load_pool_list(&self) -> Result<Vec<Arc<dyn TradingPool>>, DiscoveryError>;
}
