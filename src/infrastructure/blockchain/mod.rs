//! Direct ledger reading for Aptos venue state

pub mod memory_ledger;
pub mod rpc_client;
pub mod token_metadata;

pub use memory_ledger::InMemoryLedger;
pub use rpc_client::{LedgerClient, MoveResource, RestLedgerClient, TableItemRequest};
pub use token_metadata::{InMemoryTokenRegistry, TokenRegistry};
