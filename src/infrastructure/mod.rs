//! Infrastructure layer - ledger access and token metadata

pub mod blockchain;
