// src/math.rs
use crate::shared::errors::QuoteError;

/// `10^decimals` as a float scale factor
pub fn decimal_factor(decimals: u8) -> f64 {
    10_f64.powi(decimals as i32)
}

/// Reject amounts that cannot be quoted
pub fn validate_input_amount(input_ui_amt: f64) -> Result<(), QuoteError> {
    if !input_ui_amt.is_finite() || input_ui_amt <= 0.0 {
        return Err(QuoteError::InvalidInput(input_ui_amt));
    }
    Ok(())
}

/// Convert a UI amount to raw integer units, flooring like the on-chain coin math
pub fn ui_to_raw(input_ui_amt: f64, decimals: u8) -> Result<u64, QuoteError> {
    validate_input_amount(input_ui_amt)?;
    let raw = (input_ui_amt * decimal_factor(decimals)).floor();
    if raw >= u64::MAX as f64 {
        return Err(QuoteError::Computation(format!(
            "amount {} overflows u64 at {} decimals",
            input_ui_amt, decimals
        )));
    }
    Ok(raw as u64)
}

/// Round a non-negative UI amount to raw units, as submitted in transaction arguments
pub fn ui_to_raw_rounded(ui_amt: f64, decimals: u8) -> Result<u64, QuoteError> {
    if !ui_amt.is_finite() || ui_amt < 0.0 {
        return Err(QuoteError::InvalidInput(ui_amt));
    }
    let raw = (ui_amt * decimal_factor(decimals)).round();
    if raw >= u64::MAX as f64 {
        return Err(QuoteError::Computation(format!(
            "amount {} overflows u64 at {} decimals",
            ui_amt, decimals
        )));
    }
    Ok(raw as u64)
}

/// Convert raw integer units to a UI amount
pub fn raw_to_ui(raw: u128, decimals: u8) -> f64 {
    raw as f64 / decimal_factor(decimals)
}

/// Guard against NaN and infinities leaking out of float computations
pub fn ensure_finite(value: f64, what: &str) -> Result<f64, QuoteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuoteError::Computation(format!("{} is not finite ({})", what, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_to_raw_floors() {
        assert_eq!(ui_to_raw(1.5, 6).unwrap(), 1_500_000);
        assert_eq!(ui_to_raw(0.0000019, 6).unwrap(), 1);
        assert_eq!(ui_to_raw(7.0, 0).unwrap(), 7);
    }

    #[test]
    fn test_ui_to_raw_rejects_invalid() {
        assert!(matches!(ui_to_raw(0.0, 6), Err(QuoteError::InvalidInput(_))));
        assert!(matches!(ui_to_raw(-1.0, 6), Err(QuoteError::InvalidInput(_))));
        assert!(matches!(ui_to_raw(f64::NAN, 6), Err(QuoteError::InvalidInput(_))));
        assert!(matches!(ui_to_raw(1e30, 8), Err(QuoteError::Computation(_))));
    }

    #[test]
    fn test_ui_to_raw_rounded_accepts_zero() {
        assert_eq!(ui_to_raw_rounded(0.0, 6).unwrap(), 0);
        assert_eq!(ui_to_raw_rounded(1.0000006, 6).unwrap(), 1_000_001);
        assert!(matches!(ui_to_raw_rounded(-0.5, 6), Err(QuoteError::InvalidInput(_))));
    }

    #[test]
    fn test_raw_to_ui() {
        assert_eq!(raw_to_ui(1_500_000, 6), 1.5);
        assert_eq!(raw_to_ui(698, 0), 698.0);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(1.0, "x").is_ok());
        assert!(matches!(ensure_finite(f64::INFINITY, "x"), Err(QuoteError::Computation(_))));
    }
}
