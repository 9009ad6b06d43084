//! In-memory ledger, for fixtures and offline quoting

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::rpc_client::{LedgerClient, MoveResource, TableItemRequest};
use crate::shared::errors::LedgerError;
use crate::shared::move_types::AccountAddress;

/// Ledger backed by maps; resources keep insertion order per account
#[derive(Default)]
pub struct InMemoryLedger {
    resources: RwLock<HashMap<AccountAddress, Vec<MoveResource>>>,
    tables: RwLock<HashMap<(String, String), Value>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource
    pub fn put_resource(&self, address: &AccountAddress, resource_type: impl Into<String>, data: Value) {
        let resource_type = resource_type.into();
        let mut resources = self.resources.write();
        let entries = resources.entry(address.clone()).or_default();
        match entries.iter_mut().find(|r| r.resource_type == resource_type) {
            Some(existing) => existing.data = data,
            None => entries.push(MoveResource { resource_type, data }),
        }
    }

    /// Insert or replace a table entry; keys are compared by their JSON text
    pub fn put_table_item(&self, handle: impl Into<String>, key: &Value, value: Value) {
        self.tables.write().insert((handle.into(), key.to_string()), value);
    }

    pub fn remove_resource(&self, address: &AccountAddress, resource_type: &str) {
        if let Some(entries) = self.resources.write().get_mut(address) {
            entries.retain(|r| r.resource_type != resource_type);
        }
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn get_account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, LedgerError> {
        self.resources
            .read()
            .get(address)
            .and_then(|entries| entries.iter().find(|r| r.resource_type == resource_type))
            .map(|r| r.data.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("{} at {}", resource_type, address)))
    }

    async fn get_account_resources(&self, address: &AccountAddress) -> Result<Vec<MoveResource>, LedgerError> {
        Ok(self.resources.read().get(address).cloned().unwrap_or_default())
    }

    async fn get_table_item(&self, handle: &str, request: &TableItemRequest) -> Result<Value, LedgerError> {
        self.tables
            .read()
            .get(&(handle.to_string(), request.key.to_string()))
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("table {} key {}", handle, request.key)))
    }
}
