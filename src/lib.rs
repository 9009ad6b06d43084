//! Hippo quote engine - Aptos multi-venue swap quotes
//! Basiq, Econia and Hippo stable curve pools behind one pool contract

pub mod domain;
pub mod exchanges;
pub mod infrastructure;
pub mod math;
pub mod shared;

// Re-export main types for convenience
pub use domain::dex::{TradingPool, Venue};
pub use domain::pool::{PoolManager, PoolProvider, PoolQuote};
pub use exchanges::create_providers;
pub use infrastructure::blockchain::{InMemoryLedger, InMemoryTokenRegistry, LedgerClient, RestLedgerClient, TokenRegistry};
pub use shared::errors::QuoteError;
pub use shared::types::{PriceType, QuoteType, TokenDescriptor};
