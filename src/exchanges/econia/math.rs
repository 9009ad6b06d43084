//! Market order fills against an order book snapshot
//!
//! Each level absorbs `min(remaining, capacity)` of the input, so the consumed
//! input equals the request whenever the side is deep enough. Output per level
//! is whole lots only. Amounts are raw integer units: base units for the x
//! side, quote units for the y side.

use super::parser::{Level, OrderBookSnapshot};
use crate::shared::errors::QuoteError;

/// Raw amounts a market order consumed and received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub input: u128,
    pub output: u128,
}

fn overflow() -> QuoteError {
    QuoteError::Computation("order book fill overflows u128".to_string())
}

/// Raw quote units one lot costs at `price` ticks
fn lot_cost(price: u64, tick_size: u64) -> u128 {
    price as u128 * tick_size as u128
}

/// Sell `base_amount` raw base units into the bids
pub fn sell_base(book: &OrderBookSnapshot, base_amount: u64) -> Result<Fill, QuoteError> {
    if book.bids.is_empty() {
        return Err(QuoteError::NoLiquidity("order book has no bids".to_string()));
    }
    let lot_size = book.lot_size as u128;
    let mut remaining = base_amount as u128;
    let mut fill = Fill { input: 0, output: 0 };

    for &Level { price, size } in &book.bids {
        if remaining == 0 {
            break;
        }
        let capacity = (size as u128).checked_mul(lot_size).ok_or_else(overflow)?;
        let base = remaining.min(capacity);
        let quote = (base / lot_size)
            .checked_mul(lot_cost(price, book.tick_size))
            .ok_or_else(overflow)?;
        fill.input = fill.input.checked_add(base).ok_or_else(overflow)?;
        fill.output = fill.output.checked_add(quote).ok_or_else(overflow)?;
        remaining -= base;
    }

    if fill.output == 0 {
        return Err(QuoteError::NoLiquidity(format!(
            "{} base units is below one lot of {}",
            base_amount, book.lot_size
        )));
    }
    Ok(fill)
}

/// Spend up to `quote_amount` raw quote units on the asks
pub fn buy_base(book: &OrderBookSnapshot, quote_amount: u64) -> Result<Fill, QuoteError> {
    if book.asks.is_empty() {
        return Err(QuoteError::NoLiquidity("order book has no asks".to_string()));
    }
    let lot_size = book.lot_size as u128;
    let mut remaining = quote_amount as u128;
    let mut fill = Fill { input: 0, output: 0 };

    for &Level { price, size } in &book.asks {
        if remaining == 0 {
            break;
        }
        let cost = lot_cost(price, book.tick_size);
        if cost == 0 {
            return Err(QuoteError::Computation("ask priced at zero ticks".to_string()));
        }
        let capacity = (size as u128).checked_mul(cost).ok_or_else(overflow)?;
        let quote = remaining.min(capacity);
        let base = (quote / cost).checked_mul(lot_size).ok_or_else(overflow)?;
        fill.input = fill.input.checked_add(quote).ok_or_else(overflow)?;
        fill.output = fill.output.checked_add(base).ok_or_else(overflow)?;
        remaining -= quote;
    }

    if fill.output == 0 {
        return Err(QuoteError::NoLiquidity(format!(
            "{} quote units cannot buy one lot at the best ask",
            quote_amount
        )));
    }
    Ok(fill)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(asks: Vec<(u64, u64)>, bids: Vec<(u64, u64)>, lot_size: u64, tick_size: u64) -> OrderBookSnapshot {
        let levels = |v: Vec<(u64, u64)>| v.into_iter().map(|(price, size)| Level { price, size }).collect();
        OrderBookSnapshot::new(lot_size, tick_size, levels(asks), levels(bids)).unwrap()
    }

    #[test]
    fn test_sell_walks_bids_best_first() {
        let b = book(vec![], vec![(100, 5), (99, 10)], 1, 1);
        let fill = sell_base(&b, 7).unwrap();
        // 5 lots at 100, 2 lots at 99
        assert_eq!(fill, Fill { input: 7, output: 698 });
    }

    #[test]
    fn test_partial_fill_when_depth_runs_out() {
        let b = book(vec![], vec![(100, 5), (99, 10)], 1, 1);
        let fill = sell_base(&b, 20).unwrap();
        assert_eq!(fill.input, 15);
        assert_eq!(fill.output, 500 + 990);
    }

    #[test]
    fn test_sell_pays_whole_lots_only() {
        let b = book(vec![], vec![(100, 5)], 10, 3);
        let fill = sell_base(&b, 25).unwrap();
        assert_eq!(fill, Fill { input: 25, output: 2 * 100 * 3 });
        assert!(matches!(sell_base(&b, 9), Err(QuoteError::NoLiquidity(_))));
    }

    #[test]
    fn test_deep_book_consumes_unaligned_request() {
        let b = book(vec![], vec![(100, 100)], 10, 1);
        assert_eq!(sell_base(&b, 75).unwrap(), Fill { input: 75, output: 700 });
    }

    #[test]
    fn test_buy_walks_asks_best_first() {
        let b = book(vec![(12, 2), (10, 3)], vec![], 5, 2);
        // lot costs 20 at price 10, 24 at price 12
        let fill = buy_base(&b, 100).unwrap();
        // 60 spent at 10 for 3 lots, the remaining 40 buys one lot at 12
        assert_eq!(fill.input, 100);
        assert_eq!(fill.output, 4 * 5);
    }

    #[test]
    fn test_empty_side_has_no_liquidity() {
        let b = book(vec![(10, 1)], vec![], 1, 1);
        assert!(matches!(sell_base(&b, 1), Err(QuoteError::NoLiquidity(_))));
        let b = book(vec![], vec![(10, 1)], 1, 1);
        assert!(matches!(buy_base(&b, 100), Err(QuoteError::NoLiquidity(_))));
    }

    #[test]
    fn test_consumed_input_never_exceeds_request() {
        let b = book(vec![(7, 3), (9, 4)], vec![(8, 2), (6, 5)], 3, 2);
        for amount in 1..200u64 {
            // bid depth is 7 lots of 3 base units
            if let Ok(fill) = sell_base(&b, amount) {
                assert!(fill.input <= amount as u128);
                assert_eq!(fill.input == amount as u128, amount <= 7 * 3);
            }
            // ask depth is 3 lots at 14 plus 4 lots at 18 quote units
            if let Ok(fill) = buy_base(&b, amount) {
                assert!(fill.input <= amount as u128);
                assert_eq!(fill.input == amount as u128, amount <= 3 * 14 + 4 * 18);
            }
        }
    }
}
