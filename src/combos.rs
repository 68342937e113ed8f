//! Combo Offers
//!
//! A combo offer is a volume tier: buy at least `quantity` units of a product
//! and every unit is charged at `price`. A product's offers form a
//! [`ComboOffers`] table whose thresholds are strictly increasing, so the
//! best tier for a quantity is the last one whose threshold it reaches.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while building a combo offer table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComboOffersError {
    /// An offer's currency differs from the product currency (index, offer currency, product currency).
    #[error("Offer {0} has currency {1}, but product has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An offer has a negative unit price.
    #[error("Offer {0} has a negative unit price")]
    NegativePrice(usize),

    /// Thresholds are not strictly increasing.
    #[error("Offer {index} has threshold {quantity}, which does not exceed the previous threshold {previous}")]
    NotIncreasing {
        /// Index of the offending offer
        index: usize,

        /// Threshold of the offending offer
        quantity: u32,

        /// Threshold of the offer before it
        previous: u32,
    },
}

/// A single volume tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboOffer<'a> {
    quantity: u32,
    price: Money<'a, Currency>,
}

impl<'a> ComboOffer<'a> {
    /// Create a new offer charging `price` per unit from `quantity` units upwards.
    pub fn new(quantity: u32, price: Money<'a, Currency>) -> Self {
        Self { quantity, price }
    }

    /// Minimum quantity for this tier to apply.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price charged once the tier applies.
    pub fn price(&self) -> Money<'a, Currency> {
        self.price
    }
}

/// Combo offer table with strictly increasing thresholds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComboOffers<'a> {
    offers: SmallVec<[ComboOffer<'a>; 4]>,
}

impl<'a> ComboOffers<'a> {
    /// Create an empty table; every quantity falls back to the base price.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            offers: SmallVec::new(),
        }
    }

    /// Build a table from offers in any order.
    ///
    /// Offers are sorted by threshold. When several offers share a threshold the
    /// first one in list order is kept. A zero threshold is a tier like any
    /// other and applies to every purchase of at least one unit.
    ///
    /// # Errors
    ///
    /// Returns a [`ComboOffersError`] if an offer is priced in a currency other
    /// than `currency`, or has a negative unit price.
    pub fn new(
        offers: impl IntoIterator<Item = ComboOffer<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, ComboOffersError> {
        let mut checked = SmallVec::<[ComboOffer<'a>; 4]>::new();

        for (index, offer) in offers.into_iter().enumerate() {
            check_offer(index, &offer, currency)?;

            checked.push(offer);
        }

        // Stable sort, so equal thresholds keep their list order for dedup.
        checked.sort_by_key(ComboOffer::quantity);
        checked.dedup_by_key(|offer| offer.quantity);

        Ok(Self { offers: checked })
    }

    /// Build a table from offers that are already strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns a [`ComboOffersError`] on a currency mismatch, a negative price, or
    /// a threshold that does not exceed its predecessor.
    pub fn try_strict(
        offers: impl IntoIterator<Item = ComboOffer<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, ComboOffersError> {
        let mut checked = SmallVec::<[ComboOffer<'a>; 4]>::new();

        for (index, offer) in offers.into_iter().enumerate() {
            check_offer(index, &offer, currency)?;

            if let Some(previous) = checked
                .last()
                .map(ComboOffer::quantity)
                .filter(|previous| offer.quantity <= *previous)
            {
                return Err(ComboOffersError::NotIncreasing {
                    index,
                    quantity: offer.quantity,
                    previous,
                });
            }

            checked.push(offer);
        }

        Ok(Self { offers: checked })
    }

    /// The tier with the largest threshold not exceeding `quantity`, if any.
    pub fn tier_for(&self, quantity: u32) -> Option<&ComboOffer<'a>> {
        let reached = self
            .offers
            .partition_point(|offer| offer.quantity <= quantity);

        reached.checked_sub(1).and_then(|index| self.offers.get(index))
    }

    /// Iterate over the offers in increasing threshold order.
    pub fn iter(&self) -> impl Iterator<Item = &ComboOffer<'a>> {
        self.offers.iter()
    }

    /// Number of tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Whether the table has no tiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

fn check_offer(
    index: usize,
    offer: &ComboOffer<'_>,
    currency: &'static Currency,
) -> Result<(), ComboOffersError> {
    let offer_currency = offer.price.currency();

    if offer_currency != currency {
        return Err(ComboOffersError::CurrencyMismatch(
            index,
            offer_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if offer.price.to_minor_units() < 0 {
        return Err(ComboOffersError::NegativePrice(index));
    }

    Ok(())
}
