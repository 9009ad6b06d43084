//! DEX domain - venue tags and the pool contract

mod dex_interface;
mod dex_registry;

pub use dex_interface::{SnapshotCell, SnapshotState, TradingPool};
pub use dex_registry::Venue;
