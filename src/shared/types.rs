//! Common types used across the quote engine

use serde::{Deserialize, Serialize};

use crate::shared::move_types::TokenType;

/// Token representation as held by the token registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    pub decimals: u8,
    pub token_type: TokenType,
}

impl TokenDescriptor {
    pub fn new(symbol: impl Into<String>, decimals: u8, token_type: TokenType) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            token_type,
        }
    }
}

/// Spot rates in both directions, in UI units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceType {
    pub x_to_y: f64,
    pub y_to_x: f64,
}

/// Result of a quote query, in UI units
///
/// `input_ui_amt` is the amount the venue actually absorbs, which can be
/// less than requested when depth runs out. `avg_price` is output per unit
/// of consumed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteType {
    pub input_symbol: String,
    pub output_symbol: String,
    pub input_ui_amt: f64,
    pub output_ui_amt: f64,
    pub avg_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_impact: Option<f64>,
}

impl QuoteType {
    pub fn new(
        input_symbol: impl Into<String>,
        output_symbol: impl Into<String>,
        input_ui_amt: f64,
        output_ui_amt: f64,
    ) -> Self {
        let avg_price = if input_ui_amt > 0.0 {
            output_ui_amt / input_ui_amt
        } else {
            0.0
        };
        Self {
            input_symbol: input_symbol.into(),
            output_symbol: output_symbol.into(),
            input_ui_amt,
            output_ui_amt,
            avg_price,
            initial_price: None,
            final_price: None,
            price_impact: None,
        }
    }

    pub fn with_marginal_prices(mut self, initial_price: f64, final_price: f64) -> Self {
        self.initial_price = Some(initial_price);
        self.final_price = Some(final_price);
        self.price_impact = Some((final_price - initial_price).abs());
        self
    }
}

/// Aptos entry function payload, in the JSON shape the REST API submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_avg_price() {
        let quote = QuoteType::new("APT", "USDC", 2.0, 15.0);
        assert_eq!(quote.avg_price, 7.5);
        assert!(quote.price_impact.is_none());

        let quote = quote.with_marginal_prices(7.6, 7.4);
        assert!((quote.price_impact.unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_quote_serialization_skips_missing_prices() {
        let quote = QuoteType::new("APT", "USDC", 1.0, 7.0);
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["input_symbol"], "APT");
        assert!(json.get("price_impact").is_none());
    }
}
