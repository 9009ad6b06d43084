//! Basiq swap math: oracle-priced constant sum with an imbalance-dependent fee
//!
//! All amounts are raw integers already scaled by the pool's decimal
//! adjustment, so both sides are valued in one denomination. The math is
//! exact (`BigInt`) until the caller converts the output to UI units.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::shared::errors::QuoteError;

pub const BIPS_DENOMINATOR: i64 = 10_000;
/// Imbalance above which the quadratic penalty applies
pub const PENALTY_THRESHOLD_BIPS: i64 = 7_500;
/// Width of one penalty step, in imbalance bips
pub const PENALTY_STEP_BIPS: i64 = 100;
/// Penalty at full imbalance: `2 * ((10000 - 7500) / 100)^2`
pub const MAX_PENALTY_BIPS: i64 = 1_250;

/// Which fee schedule a trade lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeTier {
    /// The trade reduces imbalance: `fee - rebate`
    Rebate,
    /// Plain `fee`
    Flat,
    /// Post-trade imbalance above 75%: `fee + 2 * excess^2`
    Penalty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub amount_out: BigInt,
    pub effective_fee_bips: i64,
    pub tier: FeeTier,
    pub pre_trade_imbalance: BigInt,
    pub post_trade_imbalance: BigInt,
}

/// Dominant side's share of total value, in bips
pub fn imbalance_ratio(x_value: &BigInt, y_value: &BigInt) -> Result<BigInt, QuoteError> {
    let total_value = x_value + y_value;
    if !total_value.is_positive() {
        return Err(QuoteError::NoLiquidity("pool holds no value".to_string()));
    }
    let dominant = if x_value > y_value { x_value } else { y_value };
    Ok(dominant * BIPS_DENOMINATOR / total_value)
}

/// Fee in bips for a given post-trade imbalance above the penalty threshold
pub fn penalty_bips(post_trade_imbalance: &BigInt) -> i64 {
    let surplus: BigInt = (post_trade_imbalance - PENALTY_THRESHOLD_BIPS) / PENALTY_STEP_BIPS;
    let surplus: i64 = surplus.try_into().unwrap_or(i64::MAX / 4);
    surplus.saturating_mul(surplus).saturating_mul(2)
}

pub fn calc_swap_output(
    input_amount: &BigInt,
    input_reserve: &BigInt,
    output_reserve: &BigInt,
    input_price: &BigInt,
    output_price: &BigInt,
    fee_bips: i64,
    rebate_bips: i64,
) -> Result<SwapOutcome, QuoteError> {
    if !output_price.is_positive() || !input_price.is_positive() {
        return Err(QuoteError::NoLiquidity("oracle price is zero".to_string()));
    }

    let fair_input_value = input_amount * input_price;
    let input_reserve_value = input_reserve * input_price;
    let output_reserve_value = output_reserve * output_price;

    let pre_trade_imbalance = imbalance_ratio(&input_reserve_value, &output_reserve_value)?;
    if fair_input_value > output_reserve_value {
        return Err(QuoteError::NoLiquidity(
            "trade value exceeds the output reserve".to_string(),
        ));
    }
    let post_trade_imbalance = imbalance_ratio(
        &(&input_reserve_value + &fair_input_value),
        &(&output_reserve_value - &fair_input_value),
    )?;

    let (tier, effective_fee_bips) = if post_trade_imbalance < pre_trade_imbalance {
        (FeeTier::Rebate, fee_bips - rebate_bips)
    } else if post_trade_imbalance > BigInt::from(PENALTY_THRESHOLD_BIPS) {
        (FeeTier::Penalty, fee_bips + penalty_bips(&post_trade_imbalance))
    } else {
        (FeeTier::Flat, fee_bips)
    };

    let kept_bips = BIPS_DENOMINATOR - effective_fee_bips;
    let amount_out = if kept_bips <= 0 {
        BigInt::zero()
    } else {
        &fair_input_value / output_price * kept_bips / BIPS_DENOMINATOR
    };

    Ok(SwapOutcome {
        amount_out,
        effective_fee_bips,
        tier,
        pre_trade_imbalance,
        post_trade_imbalance,
    })
}
