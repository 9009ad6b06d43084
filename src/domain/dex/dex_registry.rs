//! Venue registry for the supported Aptos trading venues

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pricing model family of a venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// Basiq: oracle-priced constant sum with an imbalance-dependent fee
    ConstantSumImbalance,
    /// Econia: central limit order book
    OrderBook,
    /// Hippo: stableswap curve with a ramped amplification coefficient
    StableCurve,
}

impl Venue {
    pub fn all() -> [Venue; 3] {
        [Venue::ConstantSumImbalance, Venue::OrderBook, Venue::StableCurve]
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::ConstantSumImbalance => "Basiq",
            Venue::OrderBook => "Econia",
            Venue::StableCurve => "Hippo Stable Curve",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basiq" | "constant_sum" | "constant-sum" => Ok(Venue::ConstantSumImbalance),
            "econia" | "order_book" | "orderbook" => Ok(Venue::OrderBook),
            "stable_curve" | "stable-curve" | "hippo" => Ok(Venue::StableCurve),
            _ => Err(format!("Unknown venue: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_from_str() {
        assert_eq!("Basiq".parse::<Venue>().unwrap(), Venue::ConstantSumImbalance);
        assert_eq!("orderbook".parse::<Venue>().unwrap(), Venue::OrderBook);
        assert_eq!("stable-curve".parse::<Venue>().unwrap(), Venue::StableCurve);
        assert!("uniswap".parse::<Venue>().is_err());
    }
}
