//! Decoders for Econia registry, order book and order book table resources

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::shared::errors::LedgerError;
use crate::shared::move_types::{AccountAddress, TypeInfoRecord};
use crate::shared::utils::de_u64;

/// One aggregated price level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Price in ticks per lot
    pub price: u64,
    /// Size in lots
    pub size: u64,
}

/// Order book state as of the last reload
///
/// Asks are sorted ascending and bids descending by price, best first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    pub lot_size: u64,
    pub tick_size: u64,
    pub asks: Vec<Level>,
    pub bids: Vec<Level>,
}

impl OrderBookSnapshot {
    /// Build a snapshot from unordered levels, merging equal prices
    pub fn new(lot_size: u64, tick_size: u64, asks: Vec<Level>, bids: Vec<Level>) -> Result<Self, LedgerError> {
        if lot_size == 0 || tick_size == 0 {
            return Err(LedgerError::decode("OrderBook", "lot size and tick size must be non-zero"));
        }
        let asks = merge_levels(asks)?;
        let mut bids = merge_levels(bids)?;
        bids.reverse();
        Ok(Self {
            lot_size,
            tick_size,
            asks,
            bids,
        })
    }

    pub fn best_ask(&self) -> Option<&Level> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&Level> {
        self.bids.first()
    }
}

/// Ascending levels with one entry per price; zero-size orders are dropped
fn merge_levels(levels: Vec<Level>) -> Result<Vec<Level>, LedgerError> {
    let mut merged: BTreeMap<u64, u64> = BTreeMap::new();
    for level in levels.into_iter().filter(|l| l.size > 0) {
        let size = merged.entry(level.price).or_insert(0);
        *size = size
            .checked_add(level.size)
            .ok_or_else(|| LedgerError::decode("OrderBook", "level size overflows u64"))?;
    }
    Ok(merged.into_iter().map(|(price, size)| Level { price, size }).collect())
}

/// A market listed in the Econia registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketInfo {
    pub market_id: u64,
    pub host: AccountAddress,
    pub base_type_info: TypeInfoRecord,
    pub quote_type_info: TypeInfoRecord,
}

#[derive(Deserialize)]
struct RegistryRecord {
    markets: Vec<MarketRecord>,
}

#[derive(Deserialize)]
struct MarketRecord {
    host: AccountAddress,
    trading_pair_info: TradingPairRecord,
}

#[derive(Deserialize)]
struct TradingPairRecord {
    base_type_info: TypeInfoRecord,
    quote_type_info: TypeInfoRecord,
}

#[derive(Deserialize)]
struct OrderBooksRecord {
    map: OpenTableRecord,
}

#[derive(Deserialize)]
struct OpenTableRecord {
    base_table: TableHandleRecord,
}

#[derive(Deserialize)]
struct TableHandleRecord {
    handle: String,
}

#[derive(Deserialize)]
struct OrderBookRecord {
    #[serde(deserialize_with = "de_u64")]
    lot_size: u64,
    #[serde(deserialize_with = "de_u64")]
    tick_size: u64,
    asks: CritBitTreeRecord,
    bids: CritBitTreeRecord,
}

#[derive(Deserialize)]
struct CritBitTreeRecord {
    outer_nodes: Vec<OuterNodeRecord>,
}

#[derive(Deserialize)]
struct OuterNodeRecord {
    /// Order id: price in the upper 64 bits, serial in the lower 64
    key: String,
    value: OrderRecord,
}

#[derive(Deserialize)]
struct OrderRecord {
    #[serde(deserialize_with = "de_u64")]
    size: u64,
}

/// Decoder for Econia resources
pub struct EconiaParser;

impl EconiaParser {
    /// Markets of a `registry::Registry` resource; the vector index is the market id
    pub fn parse_markets(data: &Value) -> Result<Vec<MarketInfo>, LedgerError> {
        let record = RegistryRecord::deserialize(data).map_err(|e| LedgerError::decode("Registry", e))?;
        Ok(record
            .markets
            .into_iter()
            .enumerate()
            .map(|(market_id, market)| MarketInfo {
                market_id: market_id as u64,
                host: market.host,
                base_type_info: market.trading_pair_info.base_type_info,
                quote_type_info: market.trading_pair_info.quote_type_info,
            })
            .collect())
    }

    /// Handle of the table inside a `market::OrderBooks` resource
    pub fn parse_order_books_handle(data: &Value) -> Result<String, LedgerError> {
        let record = OrderBooksRecord::deserialize(data).map_err(|e| LedgerError::decode("OrderBooks", e))?;
        Ok(record.map.base_table.handle)
    }

    pub fn parse_order_book(data: &Value) -> Result<OrderBookSnapshot, LedgerError> {
        let record = OrderBookRecord::deserialize(data).map_err(|e| LedgerError::decode("OrderBook", e))?;
        let asks = Self::levels(record.asks)?;
        let bids = Self::levels(record.bids)?;
        OrderBookSnapshot::new(record.lot_size, record.tick_size, asks, bids)
    }

    fn levels(tree: CritBitTreeRecord) -> Result<Vec<Level>, LedgerError> {
        tree.outer_nodes
            .into_iter()
            .map(|node| {
                let order_id: u128 = node
                    .key
                    .parse()
                    .map_err(|e| LedgerError::decode("OrderBook", format!("order id '{}': {}", node.key, e)))?;
                Ok(Level {
                    price: (order_id >> 64) as u64,
                    size: node.value.size,
                })
            })
            .collect()
    }
}
