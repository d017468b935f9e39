//! Currency and rate primitives.
//!
//! All amounts handled by the engine are whole Vietnamese dong.  Rates
//! are expressed in basis points so that tax and contribution
//! arithmetic stays exact until the single rounding step performed by
//! [`round_div`].

/// Whole Vietnamese dong.
pub type Vnd = i64;

/// Basis points: `10_000` equals 100%.
pub type BasisPoints = u32;

/// Denominator for basis-point arithmetic.
pub const BP_SCALE: i128 = 10_000;

/// Divides `numerator` by `denominator`, rounding half away from zero.
///
/// `denominator` must be positive.
pub fn round_div(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

/// Applies a basis-point rate to an amount and rounds to whole dong.
pub fn apply_rate(amount: Vnd, rate: BasisPoints) -> Vnd {
    round_div(amount as i128 * rate as i128, BP_SCALE) as Vnd
}

/// Converts a basis-point rate into a ratio for display.
pub fn rate_ratio(rate: BasisPoints) -> f64 {
    rate as f64 / BP_SCALE as f64
}

/// Turns an arbitrary floating amount into a valid taxable income.
///
/// Negative, NaN and infinite values clamp to zero; everything else is
/// rounded half away from zero.
pub fn clamp_taxable(amount: f64) -> Vnd {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    if amount >= Vnd::MAX as f64 {
        return Vnd::MAX;
    }
    amount.round() as Vnd
}
