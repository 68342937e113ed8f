//! Discounts
//!
//! Percentage and rounding helpers shared by the combo price evaluator, the
//! store record parser, the fixture loader and the receipt renderer. Every
//! conversion to minor units rounds half away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::iso::Currency;
use thiserror::Error;

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Discount percent points outside of `0..=100`.
    #[error("discount of {0}% is outside of 0% to 100%")]
    OutOfRange(Decimal),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// The result is rounded half away from zero to the nearest minor unit.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or
/// cannot be represented as an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // the percentage is only reachable through multiplication
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, ROUNDING)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Convert a major-unit amount into minor units of `currency`.
///
/// Scales by the currency's exponent, so `1500` yen stays `1500` while `1.5`
/// dinar becomes `1500` fils. Returns `None` if the result does not fit in an
/// `i64`.
pub fn minor_units_of(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, ROUNDING)
        .to_i64()
}

/// Convert stored percent points (e.g. `5` for 5%) into a discount.
///
/// Zero points means the product is not discounted, so `None` is returned.
///
/// # Errors
///
/// Returns [`DiscountError::OutOfRange`] if `points` is negative or above 100.
pub fn discount_from_points(points: Decimal) -> Result<Option<Percentage>, DiscountError> {
    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return Err(DiscountError::OutOfRange(points));
    }

    if points.is_zero() {
        return Ok(None);
    }

    Ok(Some(Percentage::from(points / Decimal::ONE_HUNDRED)))
}

/// Percent points of a fractional percentage, rounded to two places for display.
pub fn percent_points(percent: &Percentage) -> Decimal {
    ((*percent) * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use rusty_money::iso::{BHD, GBP, JPY};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);

        assert_eq!(percent_of_minor(&percent, 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(Decimal::new(5, 2));

        // 5% of 30 minor units is 1.5
        assert_eq!(percent_of_minor(&percent, 30)?, 2);

        // 5% of 10 minor units is 0.5
        assert_eq!(percent_of_minor(&percent, 10)?, 1);

        Ok(())
    }

    #[test]
    fn discount_from_points_converts_to_fraction() -> TestResult {
        let discount = discount_from_points(Decimal::new(5, 0))?;

        assert_eq!(discount, Some(Percentage::from(Decimal::new(5, 2))));

        Ok(())
    }

    #[test]
    fn discount_from_points_zero_is_no_discount() -> TestResult {
        assert_eq!(discount_from_points(Decimal::ZERO)?, None);

        Ok(())
    }

    #[test]
    fn discount_from_points_accepts_full_discount() -> TestResult {
        let discount = discount_from_points(Decimal::ONE_HUNDRED)?;

        assert_eq!(discount, Some(Percentage::from(Decimal::ONE)));

        Ok(())
    }

    #[test]
    fn discount_from_points_rejects_out_of_range() {
        assert_eq!(
            discount_from_points(Decimal::new(101, 0)),
            Err(DiscountError::OutOfRange(Decimal::new(101, 0)))
        );

        assert_eq!(
            discount_from_points(Decimal::new(-1, 0)),
            Err(DiscountError::OutOfRange(Decimal::new(-1, 0)))
        );
    }

    #[test]
    fn percent_points_of_fraction() {
        let percent = Percentage::from(Decimal::new(125, 3));

        assert_eq!(percent_points(&percent), Decimal::new(1250, 2));
    }

    #[test]
    fn minor_units_follow_currency_exponent() {
        assert_eq!(minor_units_of(Decimal::new(1_999, 2), GBP), Some(1_999));
        assert_eq!(minor_units_of(Decimal::from(1_500), JPY), Some(1_500));
        assert_eq!(minor_units_of(Decimal::new(15, 1), BHD), Some(1_500));
    }

    #[test]
    fn minor_units_round_half_away_from_zero() {
        assert_eq!(minor_units_of(Decimal::new(125, 3), GBP), Some(13));
        assert_eq!(minor_units_of(Decimal::new(-125, 3), GBP), Some(-13));
        assert_eq!(minor_units_of(Decimal::new(5, 1), JPY), Some(1));
    }

    #[test]
    fn minor_units_overflow_is_none() {
        assert_eq!(minor_units_of(Decimal::MAX, GBP), None);
    }
}
