//! Error handling for the quote engine

use thiserror::Error;

/// Ledger read and decoding errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ledger returned status {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

impl LedgerError {
    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        LedgerError::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors surfaced by the pool contract
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("pool {pool} state not loaded")]
    NotLoaded { pool: String },

    #[error("failed to load pool state: {0}")]
    StateLoad(#[from] LedgerError),

    #[error("no liquidity: {0}")]
    NoLiquidity(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("computation failed: {0}")]
    Computation(String),

    #[error("invalid input amount: {0}")]
    InvalidInput(f64),
}

/// Move type tag parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeTagError {
    #[error("invalid struct tag '{tag}': {reason}")]
    InvalidStructTag { tag: String, reason: String },

    #[error("invalid account address '{0}'")]
    InvalidAddress(String),

    #[error("invalid hex-encoded name '{0}'")]
    InvalidHexName(String),
}

/// Pool discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("ledger error during discovery: {0}")]
    Ledger(#[from] LedgerError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<TypeTagError> for ConfigError {
    fn from(err: TypeTagError) -> Self {
        ConfigError::InvalidValue {
            field: "token_type",
            reason: err.to_string(),
        }
    }
}
