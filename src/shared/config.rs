use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::errors::ConfigError;
use crate::shared::move_types::{AccountAddress, TokenType};
use crate::shared::types::TokenDescriptor;

/// Network profile: fullnode endpoint and the venue contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub fullnode_url: String,
    pub basiq_address: AccountAddress,
    pub econia_address: AccountAddress,
    /// Econia markets are only routable when hosted by the aggregator
    pub hippo_aggregator_address: AccountAddress,
    pub hippo_swap_address: AccountAddress,
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "network.name",
                reason: "must not be empty".to_string(),
            });
        }
        if !(self.fullnode_url.starts_with("http://") || self.fullnode_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "network.fullnode_url",
                reason: format!("'{}' is not an http(s) URL", self.fullnode_url),
            });
        }
        Ok(())
    }
}

/// One coin list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub symbol: String,
    pub decimals: u8,
    pub token_type: TokenType,
}

impl From<TokenEntry> for TokenDescriptor {
    fn from(entry: TokenEntry) -> Self {
        TokenDescriptor::new(entry.symbol, entry.decimals, entry.token_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    pub network: NetworkConfig,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

impl QuoteConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: QuoteConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.network.validate()?;
        for token in &config.tokens {
            if token.decimals > 32 {
                return Err(ConfigError::InvalidValue {
                    field: "tokens.decimals",
                    reason: format!("{} has {} decimals", token.symbol, token.decimals),
                });
            }
        }
        Ok(config)
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<QuoteConfig, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        QuoteConfig::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[network]
name = "devnet"
fullnode_url = "https://fullnode.devnet.aptoslabs.com"
basiq_address = "0x00b1"
econia_address = "0xec"
hippo_aggregator_address = "0xa99"
hippo_swap_address = "0xa11"

[[tokens]]
symbol = "APT"
decimals = 8
token_type = "0x1::aptos_coin::AptosCoin"

[[tokens]]
symbol = "USDC"
decimals = 6
token_type = "0xa11::devnet_coins::DevnetUSDC"
"#;

    #[test]
    fn test_parse_config() {
        let config = QuoteConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.network.basiq_address.as_str(), "0xb1");
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.tokens[1].token_type.name, "DevnetUSDC");
    }

    #[test]
    fn test_reject_bad_url() {
        let bad = SAMPLE.replace("https://fullnode.devnet.aptoslabs.com", "fullnode");
        match QuoteConfig::from_toml_str(&bad) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "network.fullnode_url"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reject_bad_address() {
        let bad = SAMPLE.replace("0xec", "0xnothex");
        assert!(matches!(QuoteConfig::from_toml_str(&bad), Err(ConfigError::Parse(_))));
    }
}
