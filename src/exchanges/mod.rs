pub mod basiq;
pub mod econia;
pub mod stable_curve;

use std::sync::Arc;

use crate::domain::pool::PoolProvider;
use crate::infrastructure::blockchain::{LedgerClient, TokenRegistry};
use crate::shared::config::NetworkConfig;

pub use basiq::{BasiqPool, BasiqPoolProvider};
pub use econia::{EconiaPool, EconiaPoolProvider};
pub use stable_curve::{StableCurvePool, StableCurvePoolProvider};

/// One provider per venue, wired to the network's contract addresses
pub fn create_providers(
    network: &NetworkConfig,
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<dyn TokenRegistry>,
) -> Vec<Arc<dyn PoolProvider>> {
    vec![
        Arc::new(BasiqPoolProvider::new(
            Arc::clone(&ledger),
            Arc::clone(&registry),
            network.basiq_address.clone(),
        )),
        Arc::new(EconiaPoolProvider::new(
            Arc::clone(&ledger),
            Arc::clone(&registry),
            network.econia_address.clone(),
            network.hippo_aggregator_address.clone(),
        )),
        Arc::new(StableCurvePoolProvider::new(
            ledger,
            registry,
            network.hippo_swap_address.clone(),
        )),
    ]
}
