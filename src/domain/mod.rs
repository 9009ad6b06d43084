//! Domain layer - pool contract, venues and discovery

pub mod dex;
pub mod pool;
