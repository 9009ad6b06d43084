use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::math::{buy_base, sell_base};
use super::parser::{EconiaParser, OrderBookSnapshot};
use crate::domain::dex::{SnapshotCell, TradingPool, Venue};
use crate::infrastructure::blockchain::{LedgerClient, TableItemRequest};
use crate::math::{decimal_factor, raw_to_ui, ui_to_raw};
use crate::shared::errors::QuoteError;
use crate::shared::move_types::AccountAddress;
use crate::shared::types::{PriceType, QuoteType, TokenDescriptor};

/// One Econia market: x is the base coin, y the quote coin
pub struct EconiaPool {
    market_id: u64,
    econia_address: AccountAddress,
    /// Account holding the market's `OrderBooks`
    host: AccountAddress,
    x_token: Arc<TokenDescriptor>,
    y_token: Arc<TokenDescriptor>,
    ledger: Arc<dyn LedgerClient>,
    snapshot: SnapshotCell<OrderBookSnapshot>,
}

impl EconiaPool {
    pub fn new(
        market_id: u64,
        econia_address: AccountAddress,
        host: AccountAddress,
        x_token: Arc<TokenDescriptor>,
        y_token: Arc<TokenDescriptor>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            market_id,
            econia_address,
            host,
            x_token,
            y_token,
            ledger,
            snapshot: SnapshotCell::new(),
        }
    }

    pub fn market_id(&self) -> u64 {
        self.market_id
    }

    pub fn snapshot(&self) -> Result<Arc<OrderBookSnapshot>, QuoteError> {
        self.snapshot.loaded(&self.id())
    }

    /// UI price (y per x) of a raw tick price
    pub fn ui_price(&self, book: &OrderBookSnapshot, raw_price: u64) -> f64 {
        let x_factor = decimal_factor(self.x_token.decimals);
        let y_factor = decimal_factor(self.y_token.decimals);
        raw_price as f64 * (x_factor / y_factor) * (book.tick_size as f64 / book.lot_size as f64)
    }
}

#[async_trait]
impl TradingPool for EconiaPool {
    fn venue(&self) -> Venue {
        Venue::OrderBook
    }

    fn id(&self) -> String {
        format!(
            "Econia#{}<{}, {}>",
            self.market_id, self.x_token.symbol, self.y_token.symbol
        )
    }

    fn is_routable(&self) -> bool {
        true
    }

    fn x_token(&self) -> &Arc<TokenDescriptor> {
        &self.x_token
    }

    fn y_token(&self) -> &Arc<TokenDescriptor> {
        &self.y_token
    }

    fn is_state_loaded(&self) -> bool {
        self.snapshot.is_loaded()
    }

    async fn reload_state(&self) -> Result<(), QuoteError> {
        let _reload = self.snapshot.lock_reload().await;
        let books_type = format!("{}::market::OrderBooks", self.econia_address);
        let books = self.ledger.get_account_resource(&self.host, &books_type).await?;
        let handle = EconiaParser::parse_order_books_handle(&books)?;

        let request = TableItemRequest {
            key_type: "u64".to_string(),
            value_type: format!("{}::market::OrderBook", self.econia_address),
            key: json!(self.market_id.to_string()),
        };
        let raw_book = self.ledger.get_table_item(&handle, &request).await?;
        let book = EconiaParser::parse_order_book(&raw_book)?;
        debug!(
            pool = %self.id(),
            asks = book.asks.len(),
            bids = book.bids.len(),
            "reloaded Econia order book"
        );
        self.snapshot.replace(book);
        Ok(())
    }

    /// Top-of-book rates; an empty side reports zero
    fn get_price(&self) -> Result<PriceType, QuoteError> {
        let book = self.snapshot()?;
        // buying x hits the asks
        let y_to_x = book
            .best_ask()
            .map(|ask| self.ui_price(&book, ask.price))
            .unwrap_or(0.0);
        // selling x hits the bids
        let x_to_y = match book.best_bid() {
            Some(bid) if bid.price > 0 => 1.0 / self.ui_price(&book, bid.price),
            _ => 0.0,
        };
        Ok(PriceType { x_to_y, y_to_x })
    }

    fn get_quote(&self, input_ui_amt: f64, is_x_to_y: bool) -> Result<QuoteType, QuoteError> {
        let book = self.snapshot()?;
        let (input_token, output_token) = if is_x_to_y {
            (&self.x_token, &self.y_token)
        } else {
            (&self.y_token, &self.x_token)
        };
        let raw_input = ui_to_raw(input_ui_amt, input_token.decimals)?;
        let fill = if is_x_to_y {
            sell_base(&book, raw_input)?
        } else {
            buy_base(&book, raw_input)?
        };
        if fill.input < raw_input as u128 {
            debug!(
                pool = %self.id(),
                requested = raw_input,
                filled = fill.input as u64,
                "partial fill"
            );
        }
        Ok(QuoteType::new(
            input_token.symbol.clone(),
            output_token.symbol.clone(),
            raw_to_ui(fill.input, input_token.decimals),
            raw_to_ui(fill.output, output_token.decimals),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::InMemoryLedger;
    use serde_json::Value;

    fn order_id(price: u64, serial: u64) -> String {
        (((price as u128) << 64) | serial as u128).to_string()
    }

    fn nodes(levels: &[(u64, u64)]) -> Value {
        let outer: Vec<Value> = levels
            .iter()
            .enumerate()
            .map(|(i, (price, size))| json!({ "key": order_id(*price, i as u64), "value": { "size": size.to_string() } }))
            .collect();
        json!({ "root": "0", "inner_nodes": [], "outer_nodes": outer })
    }

    fn pool(asks: &[(u64, u64)], bids: &[(u64, u64)], x_decimals: u8, y_decimals: u8) -> (EconiaPool, Arc<InMemoryLedger>) {
        let econia: AccountAddress = "0xec".parse().unwrap();
        let host: AccountAddress = "0xa99".parse().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.put_resource(
            &host,
            "0xec::market::OrderBooks",
            json!({ "map": { "base_table": { "handle": "0xb00c" } } }),
        );
        ledger.put_table_item(
            "0xb00c",
            &json!("0"),
            json!({ "lot_size": "1", "tick_size": "1", "asks": nodes(asks), "bids": nodes(bids) }),
        );
        let x = Arc::new(TokenDescriptor::new("APT", x_decimals, "0x1::aptos_coin::AptosCoin".parse().unwrap()));
        let y = Arc::new(TokenDescriptor::new("USDC", y_decimals, "0xc0::coins::USDC".parse().unwrap()));
        let pool = EconiaPool::new(0, econia, host, x, y, ledger.clone());
        (pool, ledger)
    }

    #[tokio::test]
    async fn test_sell_fills_across_levels() {
        let (pool, _) = pool(&[], &[(100, 5), (99, 10)], 0, 0);
        assert!(matches!(pool.get_quote(7.0, true), Err(QuoteError::NotLoaded { .. })));
        pool.reload_state().await.unwrap();

        let quote = pool.get_quote(7.0, true).unwrap();
        assert_eq!(quote.input_ui_amt, 7.0);
        assert_eq!(quote.output_ui_amt, 698.0);
        assert!((quote.avg_price - 698.0 / 7.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_insufficient_depth_reports_consumed_input() {
        let (pool, _) = pool(&[], &[(100, 5), (99, 10)], 0, 0);
        pool.reload_state().await.unwrap();
        let quote = pool.get_quote(40.0, true).unwrap();
        assert_eq!(quote.input_ui_amt, 15.0);
        assert!(quote.input_ui_amt < 40.0);
    }

    #[tokio::test]
    async fn test_empty_opposite_side() {
        let (pool, _) = pool(&[(101, 3)], &[], 0, 0);
        pool.reload_state().await.unwrap();
        assert!(matches!(pool.get_quote(1.0, true), Err(QuoteError::NoLiquidity(_))));

        let price = pool.get_price().unwrap();
        assert_eq!(price.x_to_y, 0.0);
        assert_eq!(price.y_to_x, 101.0);
    }

    #[tokio::test]
    async fn test_buy_with_decimals() {
        // base has 2 decimals, quote 1: one lot of 1 raw base costs `price` raw quote
        let (pool, _) = pool(&[(50, 4)], &[(40, 1)], 2, 1);
        pool.reload_state().await.unwrap();

        let quote = pool.get_quote(12.0, false).unwrap();
        // 120 raw quote buys 2 lots at 50, the change stays with the level
        assert_eq!(quote.input_symbol, "USDC");
        assert_eq!(quote.input_ui_amt, 12.0);
        assert_eq!(quote.output_ui_amt, 0.02);

        let price = pool.get_price().unwrap();
        assert!((price.y_to_x - 500.0).abs() < 1e-9);
        assert!((price.x_to_y - 1.0 / 400.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_missing_table_entry_fails_reload() {
        let (pool, ledger) = pool(&[], &[(1, 1)], 0, 0);
        ledger.put_resource(
            &"0xa99".parse().unwrap(),
            "0xec::market::OrderBooks",
            json!({ "map": { "base_table": { "handle": "0xdead" } } }),
        );
        assert!(matches!(pool.reload_state().await, Err(QuoteError::StateLoad(_))));
        assert!(!pool.is_state_loaded());
        assert_eq!(pool.id(), "Econia#0<APT, USDC>");
    }
}
