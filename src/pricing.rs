//! Combo Pricing
//!
//! The tiered price evaluator. Given the total quantity of one product, its
//! base unit price, its combo offer table and its flat discount, work out what
//! the whole quantity costs.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    combos::{ComboOffer, ComboOffers},
    discounts::{DiscountError, percent_of_minor},
};

/// Errors that can occur while pricing a quantity.
///
/// Prices and quantities inside the supported domain never fail; these only
/// surface when amounts leave the `i64` minor-unit range.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// `quantity * unit price` does not fit in minor units.
    #[error("{quantity} units at {unit_minor} minor units each overflows")]
    Overflow {
        /// Quantity being priced
        quantity: u32,

        /// Unit price in minor units
        unit_minor: i64,
    },

    /// Discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Outcome of pricing a quantity of one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboPrice<'a> {
    quantity: u32,
    unit_price: Money<'a, Currency>,
    matched_tier: Option<ComboOffer<'a>>,
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    final_price: Money<'a, Currency>,
}

impl<'a> ComboPrice<'a> {
    /// Quantity that was priced.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price charged: the matched tier's price, or the base price.
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// The tier that set the unit price, if any.
    pub fn matched_tier(&self) -> Option<&ComboOffer<'a>> {
        self.matched_tier.as_ref()
    }

    /// `quantity * unit_price`, before the flat discount.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount taken off the subtotal by the flat discount.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount to charge for the whole quantity.
    pub fn final_price(&self) -> Money<'a, Currency> {
        self.final_price
    }
}

/// Price `quantity` units of a product.
///
/// The unit price comes from the combo tier with the largest threshold not
/// exceeding `quantity`, falling back to `base_price` when no tier is reached.
/// The discount is then taken once off `quantity * unit_price`. A zero
/// quantity always costs nothing.
///
/// # Errors
///
/// Returns a [`PricingError`] if the subtotal or discount leaves the `i64`
/// minor-unit range.
pub fn calculate_combo_price<'a>(
    quantity: u32,
    base_price: Money<'a, Currency>,
    combo_offers: &ComboOffers<'a>,
    discount: Option<&Percentage>,
) -> Result<ComboPrice<'a>, PricingError> {
    let currency = base_price.currency();

    if quantity == 0 {
        let zero = Money::from_minor(0, currency);

        return Ok(ComboPrice {
            quantity,
            unit_price: base_price,
            matched_tier: None,
            subtotal: zero,
            discount: zero,
            final_price: zero,
        });
    }

    let matched_tier = combo_offers.tier_for(quantity).copied();
    let unit_price = matched_tier.map_or(base_price, |tier| tier.price());
    let unit_minor = unit_price.to_minor_units();

    let subtotal_minor = unit_minor
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow {
            quantity,
            unit_minor,
        })?;

    let discount_minor = match discount {
        Some(percent) => percent_of_minor(percent, subtotal_minor)?,
        None => 0,
    };

    let final_minor = subtotal_minor
        .checked_sub(discount_minor)
        .ok_or(DiscountError::PercentConversion)?;

    Ok(ComboPrice {
        quantity,
        unit_price,
        matched_tier,
        subtotal: Money::from_minor(subtotal_minor, currency),
        discount: Money::from_minor(discount_minor, currency),
        final_price: Money::from_minor(0.max(final_minor), currency),
    })
}
