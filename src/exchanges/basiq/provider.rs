use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::BasiqPool;
use crate::domain::dex::{TradingPool, Venue};
use crate::domain::pool::PoolProvider;
use crate::infrastructure::blockchain::{LedgerClient, TokenRegistry};
use crate::shared::errors::DiscoveryError;
use crate::shared::move_types::{AccountAddress, StructTag, TokenType};

const POOL_RESOURCE: &str = "dex::BasiqPoolV1";

/// Discovers Basiq pools from the resources published at the Basiq address
pub struct BasiqPoolProvider {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<dyn TokenRegistry>,
    basiq_address: AccountAddress,
}

impl BasiqPoolProvider {
    pub fn new(ledger: Arc<dyn LedgerClient>, registry: Arc<dyn TokenRegistry>, basiq_address: AccountAddress) -> Self {
        Self {
            ledger,
            registry,
            basiq_address,
        }
    }
}

#[async_trait]
impl PoolProvider for BasiqPoolProvider {
    fn venue(&self) -> Venue {
        Venue::ConstantSumImbalance
    }

    async fn load_pool_list(&self) -> Result<Vec<Arc<dyn TradingPool>>, DiscoveryError> {
        let resources = self.ledger.get_account_resources(&self.basiq_address).await?;

        let mut pools: Vec<Arc<dyn TradingPool>> = Vec::new();
        for resource in resources {
            if !resource.resource_type.contains(POOL_RESOURCE) {
                continue;
            }
            let tag: StructTag = match resource.resource_type.parse() {
                Ok(tag) => tag,
                Err(error) => {
                    debug!(resource = %resource.resource_type, error = %error, "skipping malformed pool type");
                    continue;
                }
            };
            let (Some(x_tag), Some(y_tag)) = (tag.struct_param(0), tag.struct_param(1)) else {
                debug!(resource = %resource.resource_type, "skipping pool without coin type params");
                continue;
            };
            let x = self.registry.get_descriptor(&TokenType::from(x_tag));
            let y = self.registry.get_descriptor(&TokenType::from(y_tag));
            match (x, y) {
                (Some(x), Some(y)) => pools.push(Arc::new(BasiqPool::new(
                    self.basiq_address.clone(),
                    x,
                    y,
                    resource.resource_type,
                    Arc::clone(&self.ledger),
                ))),
                _ => debug!(resource = %resource.resource_type, "skipping pool with unregistered tokens"),
            }
        }
        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::{InMemoryLedger, InMemoryTokenRegistry};
    use crate::shared::types::TokenDescriptor;
    use serde_json::json;

    fn registry() -> Arc<InMemoryTokenRegistry> {
        let mut registry = InMemoryTokenRegistry::new();
        registry.insert(TokenDescriptor::new("APT", 8, "0x1::aptos_coin::AptosCoin".parse().unwrap()));
        registry.insert(TokenDescriptor::new("USDC", 6, "0xc0::coins::USDC".parse().unwrap()));
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_load_pool_list_filters_types_and_tokens() {
        let basiq: AccountAddress = "0xb1".parse().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.put_resource(
            &basiq,
            "0xb1::dex::BasiqPoolV1<0x1::aptos_coin::AptosCoin, 0xc0::coins::USDC>",
            json!({}),
        );
        ledger.put_resource(
            &basiq,
            "0xb1::dex::BasiqPoolV1<0x1::aptos_coin::AptosCoin, 0xc0::coins::UNLISTED>",
            json!({}),
        );
        ledger.put_resource(&basiq, "0xb1::dex::AdminConfig", json!({}));
        ledger.put_resource(&basiq, "0xb1::dex::BasiqPoolV1<0x1::aptos_coin::AptosCoin", json!({}));

        let provider = BasiqPoolProvider::new(ledger, registry(), basiq);
        let pools = provider.load_pool_list().await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].id(), "Basiq<APT, USDC>");
        assert_eq!(pools[0].venue(), Venue::ConstantSumImbalance);
        assert!(!pools[0].is_state_loaded());

        // a fresh list every call
        let again = provider.load_pool_list().await.unwrap();
        assert_eq!(again.len(), 1);
        assert!(!Arc::ptr_eq(&pools[0], &again[0]));
    }

    #[tokio::test]
    async fn test_empty_account_yields_no_pools() {
        let provider = BasiqPoolProvider::new(Arc::new(InMemoryLedger::new()), registry(), "0xb1".parse().unwrap());
        assert!(provider.load_pool_list().await.unwrap().is_empty());
    }
}
