use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::math::{get_a, get_d, get_y, marginal_price, FEE_DENOMINATOR};
use super::parser::{StableCurveParser, StableCurveSnapshot};
use crate::domain::dex::{SnapshotCell, TradingPool, Venue};
use crate::infrastructure::blockchain::LedgerClient;
use crate::math::{ensure_finite, raw_to_ui, ui_to_raw_rounded, validate_input_amount};
use crate::shared::errors::QuoteError;
use crate::shared::move_types::AccountAddress;
use crate::shared::types::{EntryFunctionPayload, PriceType, QuoteType, TokenDescriptor};

/// Current wall clock in microseconds, the unit of the on-chain ramp times
pub fn now_micros() -> f64 {
    Utc::now().timestamp_micros() as f64
}

/// A Hippo `StableCurvePoolInfo<X, Y>` pool
///
/// Not routable through the aggregator, so it builds its own swap and
/// liquidity payloads.
pub struct StableCurvePool {
    hippo_swap_address: AccountAddress,
    resource_type: String,
    x_token: Arc<TokenDescriptor>,
    y_token: Arc<TokenDescriptor>,
    lp_token: Arc<TokenDescriptor>,
    ledger: Arc<dyn LedgerClient>,
    snapshot: SnapshotCell<StableCurveSnapshot>,
}

/// Curve position derived from a snapshot at one point in time
struct CurvePoint {
    x: f64,
    y: f64,
    amp: f64,
    d: f64,
}

impl StableCurvePool {
    pub fn new(
        hippo_swap_address: AccountAddress,
        resource_type: String,
        x_token: Arc<TokenDescriptor>,
        y_token: Arc<TokenDescriptor>,
        lp_token: Arc<TokenDescriptor>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            hippo_swap_address,
            resource_type,
            x_token,
            y_token,
            lp_token,
            ledger,
            snapshot: SnapshotCell::new(),
        }
    }

    pub fn lp_token(&self) -> &Arc<TokenDescriptor> {
        &self.lp_token
    }

    pub fn snapshot(&self) -> Result<Arc<StableCurveSnapshot>, QuoteError> {
        self.snapshot.loaded(&self.id())
    }

    /// Reserves in UI units
    pub fn ui_balances(&self) -> Result<(f64, f64), QuoteError> {
        let s = self.snapshot()?;
        Ok(self.balances_of(&s))
    }

    fn balances_of(&self, s: &StableCurveSnapshot) -> (f64, f64) {
        (
            raw_to_ui(s.reserve_x as u128, self.x_token.decimals),
            raw_to_ui(s.reserve_y as u128, self.y_token.decimals),
        )
    }

    /// Effective amplification at `timestamp_micros`
    pub fn amplification_at(&self, timestamp_micros: f64) -> Result<f64, QuoteError> {
        let s = self.snapshot()?;
        Ok(get_a(
            s.initial_a as f64,
            s.future_a as f64,
            s.initial_a_time as f64,
            s.future_a_time as f64,
            timestamp_micros,
        ))
    }

    fn curve_point(&self, s: &StableCurveSnapshot, timestamp_micros: f64) -> Result<CurvePoint, QuoteError> {
        let (x, y) = self.balances_of(s);
        if x <= 0.0 || y <= 0.0 {
            return Err(QuoteError::NoLiquidity(format!("{} has an empty reserve", self.id())));
        }
        let amp = get_a(
            s.initial_a as f64,
            s.future_a as f64,
            s.initial_a_time as f64,
            s.future_a_time as f64,
            timestamp_micros,
        );
        let d = get_d(x, y, amp)?;
        Ok(CurvePoint { x, y, amp, d })
    }

    pub fn get_price_at(&self, timestamp_micros: f64) -> Result<PriceType, QuoteError> {
        let s = self.snapshot()?;
        let p = self.curve_point(&s, timestamp_micros)?;
        Ok(PriceType {
            x_to_y: ensure_finite(1.0 / marginal_price(p.x, p.amp, p.d)?, "x to y price")?,
            y_to_x: ensure_finite(1.0 / marginal_price(p.y, p.amp, p.d)?, "y to x price")?,
        })
    }

    pub fn get_quote_at(
        &self,
        input_ui_amt: f64,
        is_x_to_y: bool,
        timestamp_micros: f64,
    ) -> Result<QuoteType, QuoteError> {
        validate_input_amount(input_ui_amt)?;
        let s = self.snapshot()?;
        let p = self.curve_point(&s, timestamp_micros)?;
        let (input_token, output_token, balance_in, balance_out) = if is_x_to_y {
            (&self.x_token, &self.y_token, p.x, p.y)
        } else {
            (&self.y_token, &self.x_token, p.y, p.x)
        };

        let initial_price = 1.0 / marginal_price(balance_in, p.amp, p.d)?;
        let new_balance_in = balance_in + input_ui_amt;
        let new_balance_out = get_y(new_balance_in, p.amp, p.d)?;
        let gross_out = ensure_finite(balance_out - new_balance_out, "output amount")?;
        if gross_out <= 0.0 {
            return Err(QuoteError::NoLiquidity(format!(
                "{} returns nothing for {} {}",
                self.id(),
                input_ui_amt,
                input_token.symbol
            )));
        }
        let fee_amt = gross_out * s.fee as f64 / FEE_DENOMINATOR;
        let final_price = 1.0 / marginal_price(new_balance_in, p.amp, p.d)?;

        Ok(QuoteType::new(
            input_token.symbol.clone(),
            output_token.symbol.clone(),
            input_ui_amt,
            gross_out - fee_amt,
        )
        .with_marginal_prices(
            ensure_finite(initial_price, "initial price")?,
            ensure_finite(final_price, "final price")?,
        ))
    }

    /// Reserves returned for burning `lp_ui_amt` out of `lp_supply_ui_amt`
    pub fn estimate_withdrawal_output(&self, lp_ui_amt: f64, lp_supply_ui_amt: f64) -> Result<(f64, f64), QuoteError> {
        validate_input_amount(lp_ui_amt)?;
        if !lp_supply_ui_amt.is_finite() || lp_supply_ui_amt <= 0.0 || lp_ui_amt > lp_supply_ui_amt {
            return Err(QuoteError::InvalidInput(lp_supply_ui_amt));
        }
        let (x, y) = self.ui_balances()?;
        let fraction = lp_ui_amt / lp_supply_ui_amt;
        Ok((x * fraction, y * fraction))
    }

    /// Y needed alongside a deposit of `x_ui_amt` to keep the pool ratio
    pub fn estimate_needed_y_from_x_deposit(&self, x_ui_amt: f64) -> Result<f64, QuoteError> {
        validate_input_amount(x_ui_amt)?;
        let (x, y) = self.ui_balances()?;
        if x <= 0.0 {
            return Err(QuoteError::NoLiquidity(format!("{} has no {}", self.id(), self.x_token.symbol)));
        }
        Ok(y * x_ui_amt / x)
    }

    /// X needed alongside a deposit of `y_ui_amt` to keep the pool ratio
    pub fn estimate_needed_x_from_y_deposit(&self, y_ui_amt: f64) -> Result<f64, QuoteError> {
        validate_input_amount(y_ui_amt)?;
        let (x, y) = self.ui_balances()?;
        if y <= 0.0 {
            return Err(QuoteError::NoLiquidity(format!("{} has no {}", self.id(), self.y_token.symbol)));
        }
        Ok(x * y_ui_amt / y)
    }

    fn script_function(&self, name: &str) -> String {
        format!("{}::stable_curve_scripts::{}", self.hippo_swap_address, name)
    }

    fn type_arguments(&self) -> Vec<String> {
        vec![self.x_token.token_type.to_string(), self.y_token.token_type.to_string()]
    }

    pub fn build_add_liquidity_payload(&self, x_ui_amt: f64, y_ui_amt: f64) -> Result<EntryFunctionPayload, QuoteError> {
        Ok(EntryFunctionPayload {
            function: self.script_function("add_liquidity"),
            type_arguments: self.type_arguments(),
            arguments: vec![
                ui_to_raw_rounded(x_ui_amt, self.x_token.decimals)?.to_string(),
                ui_to_raw_rounded(y_ui_amt, self.y_token.decimals)?.to_string(),
            ],
        })
    }

    pub fn build_remove_liquidity_payload(
        &self,
        lp_ui_amt: f64,
        x_min_ui_amt: f64,
        y_min_ui_amt: f64,
    ) -> Result<EntryFunctionPayload, QuoteError> {
        validate_input_amount(lp_ui_amt)?;
        Ok(EntryFunctionPayload {
            function: self.script_function("remove_liquidity"),
            type_arguments: self.type_arguments(),
            arguments: vec![
                ui_to_raw_rounded(lp_ui_amt, self.lp_token.decimals)?.to_string(),
                ui_to_raw_rounded(x_min_ui_amt, self.x_token.decimals)?.to_string(),
                ui_to_raw_rounded(y_min_ui_amt, self.y_token.decimals)?.to_string(),
            ],
        })
    }
}

#[async_trait]
impl TradingPool for StableCurvePool {
    fn venue(&self) -> Venue {
        Venue::StableCurve
    }

    fn id(&self) -> String {
        format!("HippoStableCurve<{}, {}>", self.x_token.symbol, self.y_token.symbol)
    }

    fn is_routable(&self) -> bool {
        false
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
            .get_account_resource(&self.hippo_swap_address, &self.resource_type)
            .await?;
        let snapshot = StableCurveParser::parse_pool_data(&data)?;
        debug!(
            pool = %self.id(),
            reserve_x = snapshot.reserve_x,
            reserve_y = snapshot.reserve_y,
            "reloaded stable curve pool"
        );
        self.snapshot.replace(snapshot);
        Ok(())
    }

    fn get_price(&self) -> Result<PriceType, QuoteError> {
        self.get_price_at(now_micros())
    }

    fn get_quote(&self, input_ui_amt: f64, is_x_to_y: bool) -> Result<QuoteType, QuoteError> {
        self.get_quote_at(input_ui_amt, is_x_to_y, now_micros())
    }

    /// `swap_script(x_in, y_in, x_min_out, y_min_out)`
    fn build_swap_payload(
        &self,
        input_ui_amt: f64,
        min_out_ui_amt: f64,
        is_x_to_y: bool,
    ) -> Result<EntryFunctionPayload, QuoteError> {
        validate_input_amount(input_ui_amt)?;
        let (from, to) = if is_x_to_y {
            (&self.x_token, &self.y_token)
        } else {
            (&self.y_token, &self.x_token)
        };
        let amount_in = ui_to_raw_rounded(input_ui_amt, from.decimals)?;
        let min_out = ui_to_raw_rounded(min_out_ui_amt, to.decimals)?;
        let arguments = if is_x_to_y {
            [amount_in, 0, 0, min_out]
        } else {
            [0, amount_in, min_out, 0]
        };
        Ok(EntryFunctionPayload {
            function: self.script_function("swap_script"),
            type_arguments: self.type_arguments(),
            arguments: arguments.iter().map(|v| v.to_string()).collect(),
        })
    }
}
