pub mod adapter;
pub mod math;
pub mod parser;
pub mod provider;

pub use adapter::EconiaPool;
pub use parser::{EconiaParser, Level, MarketInfo, OrderBookSnapshot};
pub use provider::EconiaPoolProvider;
