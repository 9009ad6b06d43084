use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use tracing::debug;

use super::math::calc_swap_output;
use super::parser::{BasiqParser, BasiqSnapshot};
use crate::domain::dex::{SnapshotCell, TradingPool, Venue};
use crate::infrastructure::blockchain::LedgerClient;
use crate::math::{decimal_factor, raw_to_ui, ui_to_raw};
use crate::shared::errors::QuoteError;
use crate::shared::move_types::AccountAddress;
use crate::shared::types::{PriceType, QuoteType, TokenDescriptor};

/// A Basiq `BasiqPoolV1<X, Y>` pool
pub struct BasiqPool {
    owner: AccountAddress,
    x_token: Arc<TokenDescriptor>,
    y_token: Arc<TokenDescriptor>,
    /// Resource type exactly as the ledger lists it
    resource_type: String,
    ledger: Arc<dyn LedgerClient>,
    snapshot: SnapshotCell<BasiqSnapshot>,
}

impl BasiqPool {
    pub fn new(
        owner: AccountAddress,
        x_token: Arc<TokenDescriptor>,
        y_token: Arc<TokenDescriptor>,
        resource_type: String,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            owner,
            x_token,
            y_token,
            resource_type,
            ledger,
            snapshot: SnapshotCell::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn snapshot(&self) -> Result<Arc<BasiqSnapshot>, QuoteError> {
        self.snapshot.loaded(&self.id())
    }
}

#[async_trait]
impl TradingPool for BasiqPool {
    fn venue(&self) -> Venue {
        Venue::ConstantSumImbalance
    }

    fn id(&self) -> String {
        format!("Basiq<{}, {}>", self.x_token.symbol, self.y_token.symbol)
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
        let data = self
            .ledger
            .get_account_resource(&self.owner, &self.resource_type)
            .await?;
        let snapshot = BasiqParser::parse_pool_data(&self.owner, &data)?;
        debug!(
            pool = %self.id(),
            x_reserve = snapshot.x_reserve,
            y_reserve = snapshot.y_reserve,
            "reloaded Basiq pool"
        );
        self.snapshot.replace(snapshot);
        Ok(())
    }

    /// Oracle-implied spot rates, before fees
    fn get_price(&self) -> Result<PriceType, QuoteError> {
        let s = self.snapshot()?;
        let x_value = s.x_price as f64 * s.x_decimal_adjustment as f64 * decimal_factor(self.x_token.decimals);
        let y_value = s.y_price as f64 * s.y_decimal_adjustment as f64 * decimal_factor(self.y_token.decimals);
        if x_value <= 0.0 || y_value <= 0.0 {
            return Err(QuoteError::NoLiquidity(format!("{} has a zero oracle price", self.id())));
        }
        Ok(PriceType {
            x_to_y: x_value / y_value,
            y_to_x: y_value / x_value,
        })
    }

    fn get_quote(&self, input_ui_amt: f64, is_x_to_y: bool) -> Result<QuoteType, QuoteError> {
        let s = self.snapshot()?;
        let (input_token, output_token) = if is_x_to_y {
            (&self.x_token, &self.y_token)
        } else {
            (&self.y_token, &self.x_token)
        };
        let (reserve_in, reserve_out) = if is_x_to_y {
            (s.x_reserve, s.y_reserve)
        } else {
            (s.y_reserve, s.x_reserve)
        };
        let (adjust_in, adjust_out) = if is_x_to_y {
            (s.x_decimal_adjustment, s.y_decimal_adjustment)
        } else {
            (s.y_decimal_adjustment, s.x_decimal_adjustment)
        };
        let (price_in, price_out) = if is_x_to_y {
            (s.x_price, s.y_price)
        } else {
            (s.y_price, s.x_price)
        };

        let coin_in_amt = ui_to_raw(input_ui_amt, input_token.decimals)?;
        if coin_in_amt == 0 {
            return Err(QuoteError::NoLiquidity(format!(
                "{} {} is below one raw unit",
                input_ui_amt, input_token.symbol
            )));
        }
        let adjust_in = BigInt::from(adjust_in);
        let adjust_out = BigInt::from(adjust_out);

        let outcome = calc_swap_output(
            &(BigInt::from(coin_in_amt) * &adjust_in),
            &(BigInt::from(reserve_in) * &adjust_in),
            &(BigInt::from(reserve_out) * &adjust_out),
            &BigInt::from(price_in),
            &BigInt::from(price_out),
            s.fee_bips as i64,
            s.rebate_bips as i64,
        )?;

        let coin_out_amt = (outcome.amount_out / adjust_out)
            .to_u128()
            .ok_or_else(|| QuoteError::Computation("output amount out of range".to_string()))?;

        debug!(
            pool = %self.id(),
            tier = ?outcome.tier,
            fee_bips = outcome.effective_fee_bips,
            coin_in_amt,
            coin_out_amt,
            "Basiq quote"
        );

        Ok(QuoteType::new(
            input_token.symbol.clone(),
            output_token.symbol.clone(),
            raw_to_ui(coin_in_amt as u128, input_token.decimals),
            raw_to_ui(coin_out_amt, output_token.decimals),
        ))
    }
}
