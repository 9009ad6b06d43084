//! Stable curve math in UI units
//!
//! The invariant for balances `x, y`, amplification `A` and invariant `D` is
//! `2A(x + y) + D = 2AD + D^3 / (4xy)`. `D` and the counterpart balance are
//! solved by Newton iteration with a hard iteration bound.

use crate::shared::errors::QuoteError;

pub const FEE_DENOMINATOR: f64 = 1_000_000.0;
pub const MAX_ITERATIONS: usize = 255;
pub const CONVERGENCE_THRESHOLD: f64 = 1e-8;
/// Step size relative to the iterate that counts as converged
pub const RELATIVE_TOLERANCE: f64 = 1e-12;
/// Step for the finite-difference marginal price, in token units
pub const PRICE_STEP: f64 = 0.001;

/// Amplification coefficient at `timestamp`, ramping linearly between the two points
pub fn get_a(initial_a: f64, future_a: f64, initial_a_time: f64, future_a_time: f64, timestamp: f64) -> f64 {
    if timestamp >= future_a_time {
        return future_a;
    }
    if timestamp <= initial_a_time || future_a_time <= initial_a_time {
        return initial_a;
    }
    let elapsed = (timestamp - initial_a_time) / (future_a_time - initial_a_time);
    if future_a < initial_a {
        initial_a - (initial_a - future_a) * elapsed
    } else {
        initial_a + (future_a - initial_a) * elapsed
    }
}

fn converged(previous: f64, next: f64) -> bool {
    let diff = (previous - next).abs();
    // large iterates cycle a few ulps apart, well above the absolute threshold
    diff <= CONVERGENCE_THRESHOLD || diff <= next.abs() * RELATIVE_TOLERANCE
}

fn check_iterate(value: f64, what: &str) -> Result<f64, QuoteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuoteError::Computation(format!("{} diverged", what)))
    }
}

/// Invariant `D` for balances `x`, `y`
pub fn get_d(x: f64, y: f64, amp: f64) -> Result<f64, QuoteError> {
    let sum = x + y;
    if sum == 0.0 {
        return Ok(0.0);
    }
    let mut d = sum;
    for _ in 0..MAX_ITERATIONS {
        let numerator = 8.0 * amp * x * y * sum + 2.0 * d * d * d;
        let denominator = 3.0 * d * d + 4.0 * x * y * (2.0 * amp - 1.0);
        let next = check_iterate(numerator / denominator, "invariant D")?;
        if converged(d, next) {
            return Ok(next);
        }
        d = next;
    }
    Err(QuoteError::Computation(format!(
        "invariant D did not converge in {} iterations",
        MAX_ITERATIONS
    )))
}

/// Counterpart balance for `x` on the curve with invariant `d`
pub fn get_y(x: f64, amp: f64, d: f64) -> Result<f64, QuoteError> {
    if d == 0.0 {
        return Ok(0.0);
    }
    if x <= 0.0 {
        return Err(QuoteError::Computation(format!("balance {} is not positive", x)));
    }
    let b = x + d / (2.0 * amp);
    let c = d * d * d / (8.0 * amp * x);
    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let next = check_iterate((y * y + c) / (2.0 * y + b - d), "balance y")?;
        if converged(y, next) {
            return Ok(next);
        }
        y = next;
    }
    Err(QuoteError::Computation(format!(
        "balance y did not converge in {} iterations",
        MAX_ITERATIONS
    )))
}

/// Input per unit of output at balance `x`, by finite difference over `PRICE_STEP`
pub fn marginal_price(x: f64, amp: f64, d: f64) -> Result<f64, QuoteError> {
    if x <= PRICE_STEP {
        return Err(QuoteError::Computation(format!(
            "balance {} too small for a marginal price",
            x
        )));
    }
    let y = get_y(x, amp, d)?;
    let shifted = get_y(x - PRICE_STEP, amp, d)?;
    let delta = shifted - y;
    if delta <= 0.0 {
        return Err(QuoteError::Computation("curve is flat at this balance".to_string()));
    }
    Ok(PRICE_STEP / delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_invariant() {
        let d = get_d(1000.0, 1000.0, 100.0).unwrap();
        assert!((d - 2000.0).abs() < 1e-6);
        assert_eq!(get_d(0.0, 0.0, 100.0).unwrap(), 0.0);
        assert_eq!(get_y(5.0, 100.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_y_then_d_round_trip() {
        for &(x, y, amp) in &[
            (1000.0, 1000.0, 100.0),
            (1500.0, 520.0, 85.0),
            (3.0, 2900.0, 10.0),
            (1.0, 999.0, 1.0),
            (250_000.0, 260_000.0, 2000.0),
        ] {
            let d = get_d(x, y, amp).unwrap();
            let solved = get_y(x, amp, d).unwrap();
            assert!((solved - y).abs() / y < 1e-9, "y {} vs {}", solved, y);
            let again = get_d(x, solved, amp).unwrap();
            assert!((again - d).abs() / d < 1e-9, "D {} vs {}", again, d);
        }
    }

    #[test]
    fn test_converges_across_reasonable_ratios() {
        for ratio in [1.0, 2.0, 10.0, 100.0, 1000.0] {
            for amp in [1.0, 10.0, 100.0, 5000.0] {
                let x = 1000.0;
                let y = x / ratio;
                assert!(get_d(x, y, amp).is_ok());
                assert!(get_d(y, x, amp).is_ok());
            }
        }
    }

    #[test]
    fn test_converges_at_large_magnitudes() {
        for &(x, y) in &[(1e9, 1e8), (1e8, 1e9), (1e9, 1e7), (5e8, 5e6), (3e8, 3e8)] {
            for amp in [100.0, 1000.0, 5000.0] {
                let d = get_d(x, y, amp).unwrap();
                let solved = get_y(x, amp, d).unwrap();
                assert!((solved - y).abs() / y < 1e-9, "y {} vs {} at A {}", solved, y, amp);
                // a trade the size of the smaller reserve
                let moved = get_y(x + y.min(x), amp, d).unwrap();
                assert!(moved > 0.0 && moved < y);
            }
        }
    }

    #[test]
    fn test_non_finite_iterate_is_an_error() {
        assert!(matches!(get_d(1.0, 1.0, f64::NAN), Err(QuoteError::Computation(_))));
        assert!(matches!(get_y(0.0, 100.0, 10.0), Err(QuoteError::Computation(_))));
    }

    #[test]
    fn test_ramp() {
        // increasing ramp from 100 to 200 over [1000, 2000]
        assert_eq!(get_a(100.0, 200.0, 1000.0, 2000.0, 500.0), 100.0);
        assert_eq!(get_a(100.0, 200.0, 1000.0, 2000.0, 1500.0), 150.0);
        assert_eq!(get_a(100.0, 200.0, 1000.0, 2000.0, 2000.0), 200.0);
        assert_eq!(get_a(100.0, 200.0, 1000.0, 2000.0, 9000.0), 200.0);
        // decreasing ramp
        assert_eq!(get_a(200.0, 100.0, 1000.0, 2000.0, 1250.0), 175.0);
        // collapsed window
        assert_eq!(get_a(80.0, 80.0, 0.0, 0.0, 42.0), 80.0);
    }

    #[test]
    fn test_marginal_price_near_parity() {
        let d = get_d(1000.0, 1000.0, 100.0).unwrap();
        let price = marginal_price(1000.0, 100.0, d).unwrap();
        assert!((price - 1.0).abs() < 1e-3);
        assert!(matches!(marginal_price(0.0005, 100.0, d), Err(QuoteError::Computation(_))));
    }
}
