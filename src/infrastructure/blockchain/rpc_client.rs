//! Aptos ledger read interface and its REST fullnode implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::shared::errors::LedgerError;
use crate::shared::move_types::AccountAddress;

/// A resource as returned by `GET /accounts/{address}/resources`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: Value,
}

/// Body of `POST /tables/{handle}/item`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableItemRequest {
    pub key_type: String,
    pub value_type: String,
    pub key: Value,
}

/// Read-only access to on-chain resources and table entries
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the `data` of one resource at `address`
    async fn get_account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, LedgerError>;

    /// Enumerate every resource stored at `address`
    async fn get_account_resources(&self, address: &AccountAddress) -> Result<Vec<MoveResource>, LedgerError>;

    /// Fetch one table entry
    async fn get_table_item(&self, handle: &str, request: &TableItemRequest) -> Result<Value, LedgerError>;
}

/// Aptos fullnode REST client wrapper
pub struct RestLedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestLedgerClient {
    /// Create a client for a fullnode URL such as `https://fullnode.devnet.aptoslabs.com`
    pub fn new(fullnode_url: &str) -> Self {
        let trimmed = fullnode_url.trim_end_matches('/');
        let base_url = if trimmed.ends_with("/v1") {
            trimmed.to_string()
        } else {
            format!("{}/v1", trimmed)
        };
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json(&self, url: String, response: reqwest::Response) -> Result<Value, LedgerError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(url));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl LedgerClient for RestLedgerClient {
    async fn get_account_resource(
        &self,
        address: &AccountAddress,
        resource_type: &str,
    ) -> Result<Value, LedgerError> {
        let url = format!("{}/accounts/{}/resource/{}", self.base_url, address, resource_type);
        debug!(%url, "fetching account resource");
        let response = self.client.get(&url).send().await?;
        let mut body = self.read_json(url, response).await?;
        match body.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(LedgerError::decode(resource_type, "response has no data field")),
        }
    }

    async fn get_account_resources(&self, address: &AccountAddress) -> Result<Vec<MoveResource>, LedgerError> {
        let url = format!("{}/accounts/{}/resources", self.base_url, address);
        debug!(%url, "fetching account resources");
        let response = self.client.get(&url).send().await?;
        let body = self.read_json(url, response).await?;
        serde_json::from_value(body).map_err(|e| LedgerError::decode(format!("resources at {}", address), e))
    }

    async fn get_table_item(&self, handle: &str, request: &TableItemRequest) -> Result<Value, LedgerError> {
        let url = format!("{}/tables/{}/item", self.base_url, handle);
        debug!(%url, key = %request.key, "fetching table item");
        let response = self.client.post(&url).json(request).send().await?;
        self.read_json(url, response).await
    }
}
