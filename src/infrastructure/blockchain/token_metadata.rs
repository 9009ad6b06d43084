//! Token registry: maps on-chain coin types to symbol and decimals

use std::collections::HashMap;
use std::sync::Arc;

use crate::shared::config::TokenEntry;
use crate::shared::move_types::TokenType;
use crate::shared::types::TokenDescriptor;

/// Lookup interface the providers filter pools with
pub trait TokenRegistry: Send + Sync {
    fn has_token(&self, token_type: &TokenType) -> bool;

    fn get_descriptor(&self, token_type: &TokenType) -> Option<Arc<TokenDescriptor>>;
}

/// Coin list held in memory, usually built from the config's `[[tokens]]`
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenRegistry {
    tokens: HashMap<TokenType, Arc<TokenDescriptor>>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TokenEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry.into());
        }
        registry
    }

    /// Register a token; a later entry for the same type replaces the earlier one
    pub fn insert(&mut self, descriptor: TokenDescriptor) {
        self.tokens
            .insert(descriptor.token_type.clone(), Arc::new(descriptor));
    }

    pub fn find_by_symbol(&self, symbol: &str) -> Option<Arc<TokenDescriptor>> {
        self.tokens
            .values()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenRegistry for InMemoryTokenRegistry {
    fn has_token(&self, token_type: &TokenType) -> bool {
        self.tokens.contains_key(token_type)
    }

    fn get_descriptor(&self, token_type: &TokenType) -> Option<Arc<TokenDescriptor>> {
        self.tokens.get(token_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let apt: TokenType = "0x1::aptos_coin::AptosCoin".parse().unwrap();
        let registry = InMemoryTokenRegistry::from_entries(vec![TokenEntry {
            symbol: "APT".to_string(),
            decimals: 8,
            token_type: apt.clone(),
        }]);

        assert!(registry.has_token(&apt));
        assert_eq!(registry.get_descriptor(&apt).unwrap().decimals, 8);
        assert_eq!(registry.find_by_symbol("apt").unwrap().token_type, apt);

        let other: TokenType = "0x0001::aptos_coin::AptosCoin".parse().unwrap();
        assert!(registry.has_token(&other));
        let unknown: TokenType = "0x2::x::Y".parse().unwrap();
        assert!(!registry.has_token(&unknown));
        assert!(registry.get_descriptor(&unknown).is_none());
    }
}
