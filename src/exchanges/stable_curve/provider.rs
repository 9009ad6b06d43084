use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::StableCurvePool;
use crate::domain::dex::{TradingPool, Venue};
use crate::domain::pool::PoolProvider;
use crate::infrastructure::blockchain::{LedgerClient, TokenRegistry};
use crate::shared::errors::DiscoveryError;
use crate::shared::move_types::{AccountAddress, StructTag, TokenType, TypeTag};
use crate::shared::types::TokenDescriptor;

const POOL_RESOURCE: &str = "stable_curve_swap::StableCurvePoolInfo";

/// Discovers Hippo stable curve pools
pub struct StableCurvePoolProvider {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<dyn TokenRegistry>,
    hippo_swap_address: AccountAddress,
}

impl StableCurvePoolProvider {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        registry: Arc<dyn TokenRegistry>,
        hippo_swap_address: AccountAddress,
    ) -> Self {
        Self {
            ledger,
            registry,
            hippo_swap_address,
        }
    }

    /// LP coin type: the third type parameter when present, else `LPToken<X, Y>`
    fn lp_token_type(&self, pool_tag: &StructTag, x_tag: &StructTag, y_tag: &StructTag) -> TokenType {
        match pool_tag.struct_param(2) {
            Some(lp_tag) => TokenType::from(lp_tag),
            None => TokenType::from(&StructTag {
                address: self.hippo_swap_address.clone(),
                module: "stable_curve_swap".to_string(),
                name: "LPToken".to_string(),
                type_params: vec![TypeTag::Struct(x_tag.clone()), TypeTag::Struct(y_tag.clone())],
            }),
        }
    }
}

#[async_trait]
impl PoolProvider for StableCurvePoolProvider {
    fn venue(&self) -> Venue {
        Venue::StableCurve
    }

    async fn load_pool_list(&self) -> Result<Vec<Arc<dyn TradingPool>>, DiscoveryError> {
        let resources = self.ledger.get_account_resources(&self.hippo_swap_address).await?;

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
            let (Some(x), Some(y)) = (
                self.registry.get_descriptor(&TokenType::from(x_tag)),
                self.registry.get_descriptor(&TokenType::from(y_tag)),
            ) else {
                debug!(resource = %resource.resource_type, "skipping pool with unregistered tokens");
                continue;
            };

            let lp_type = self.lp_token_type(&tag, x_tag, y_tag);
            // LP coins are rarely listed, so fall back to a derived descriptor
            let lp = self.registry.get_descriptor(&lp_type).unwrap_or_else(|| {
                Arc::new(TokenDescriptor::new(
                    format!("{}-{}-LP", x.symbol, y.symbol),
                    x.decimals,
                    lp_type,
                ))
            });

            pools.push(Arc::new(StableCurvePool::new(
                self.hippo_swap_address.clone(),
                resource.resource_type,
                x,
                y,
                lp,
                Arc::clone(&self.ledger),
            )));
        }
        Ok(pools)
    }
}
