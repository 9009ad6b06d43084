use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{EconiaParser, EconiaPool};
use crate::domain::dex::{TradingPool, Venue};
use crate::domain::pool::PoolProvider;
use crate::infrastructure::blockchain::{LedgerClient, TokenRegistry};
use crate::shared::errors::DiscoveryError;
use crate::shared::move_types::{AccountAddress, TokenType};

/// Discovers Econia markets hosted by the aggregator
pub struct EconiaPoolProvider {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<dyn TokenRegistry>,
    econia_address: AccountAddress,
    host_address: AccountAddress,
}

impl EconiaPoolProvider {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        registry: Arc<dyn TokenRegistry>,
        econia_address: AccountAddress,
        host_address: AccountAddress,
    ) -> Self {
        Self {
            ledger,
            registry,
            econia_address,
            host_address,
        }
    }
}

#[async_trait]
impl PoolProvider for EconiaPoolProvider {
    fn venue(&self) -> Venue {
        Venue::OrderBook
    }

    async fn load_pool_list(&self) -> Result<Vec<Arc<dyn TradingPool>>, DiscoveryError> {
        let registry_type = format!("{}::registry::Registry", self.econia_address);
        let data = self
            .ledger
            .get_account_resource(&self.econia_address, &registry_type)
            .await?;
        let markets = EconiaParser::parse_markets(&data)?;

        let mut pools: Vec<Arc<dyn TradingPool>> = Vec::new();
        for market in markets {
            if market.host != self.host_address {
                continue;
            }
            let (base, quote) = match (
                TokenType::from_type_info(&market.base_type_info),
                TokenType::from_type_info(&market.quote_type_info),
            ) {
                (Ok(base), Ok(quote)) => (base, quote),
                (Err(error), _) | (_, Err(error)) => {
                    debug!(market_id = market.market_id, error = %error, "skipping market with undecodable type info");
                    continue;
                }
            };
            match (self.registry.get_descriptor(&base), self.registry.get_descriptor(&quote)) {
                (Some(x), Some(y)) => pools.push(Arc::new(EconiaPool::new(
                    market.market_id,
                    self.econia_address.clone(),
                    market.host,
                    x,
                    y,
                    Arc::clone(&self.ledger),
                ))),
                _ => debug!(market_id = market.market_id, base = %base, quote = %quote, "skipping market with unregistered tokens"),
            }
        }
        Ok(pools)
    }
}
