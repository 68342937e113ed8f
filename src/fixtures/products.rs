//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, JPY, USD},
};
use serde::Deserialize;

use decimal_percentage::Percentage;

use crate::{
    combos::{ComboOffer, ComboOffers},
    discounts::{discount_from_points, minor_units_of},
    fixtures::FixtureError,
    products::Product,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Base unit price (e.g., "100.00 GBP")
    pub price: String,

    /// Flat discount (e.g., "5%" or "0.05")
    #[serde(default)]
    pub discount: Option<String>,

    /// Volume tiers, in any order
    #[serde(default)]
    pub combo_offers: Vec<ComboOfferFixture>,
}

/// Combo offer fixture
#[derive(Debug, Deserialize)]
pub struct ComboOfferFixture {
    /// Minimum quantity for the tier
    pub quantity: u32,

    /// Unit price once the tier is reached (e.g., "95.00 GBP")
    pub price: String,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        let discount = fixture
            .discount
            .as_deref()
            .map(parse_percentage)
            .transpose()?
            .flatten();

        let offers = fixture
            .combo_offers
            .iter()
            .map(|offer| {
                let (minor_units, offer_currency) = parse_price(&offer.price)?;

                Ok(ComboOffer::new(
                    offer.quantity,
                    Money::from_minor(minor_units, offer_currency),
                ))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Product {
            name: fixture.name,
            price,
            discount,
            combo_offers: ComboOffers::new(offers, currency)?,
        })
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        "JPY" => JPY,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let minor_units = minor_units_of(amount, currency)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a discount string (e.g., "5%" or "0.05") into a `Percentage`
///
/// A zero discount parses to `None`.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or lies outside 0-100%.
pub fn parse_percentage(s: &str) -> Result<Option<Percentage>, FixtureError> {
    let trimmed = s.trim();

    let points = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    } else {
        trimmed
            .parse::<Decimal>()
            .ok()
            .and_then(|fraction| fraction.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))?
    };

    discount_from_points(points).map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}
