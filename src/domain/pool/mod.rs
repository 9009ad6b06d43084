//! Pool domain - discovery contract and pool management

mod pool_discovery;
mod pool_manager;

pub use pool_discovery::PoolProvider;
pub use pool_manager::{PoolManager, PoolQuote};
