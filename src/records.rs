//! Store Records
//!
//! Rows arrive from the hosted store as loosely typed JSON: prices may be
//! numbers or strings, and combo offers are a JSON column that may hold an
//! array, a JSON-encoded string, or nothing at all. Everything is parsed into
//! typed [`Product`]s and [`CartLine`]s here, before any pricing happens.
//!
//! Malformed combo offers fail closed: the product keeps its base price and a
//! warning is logged. A malformed base price or discount is an error, since
//! there is no safe price to fall back to.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, line::CartLine},
    combos::{ComboOffer, ComboOffers},
    discounts::{DiscountError, discount_from_points, minor_units_of},
    products::{Catalog, Product},
};

/// Errors raised while parsing store rows.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Rows could not be deserialized.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Identifier is neither a string nor a number.
    #[error("Invalid identifier: {0}")]
    InvalidId(Value),

    /// Price is missing or not a decimal amount.
    #[error("Invalid price for product {id}: {value}")]
    InvalidPrice {
        /// Product identifier
        id: String,

        /// Raw price value
        value: Value,
    },

    /// Discount is not a decimal amount.
    #[error("Invalid discount for product {id}: {value}")]
    InvalidDiscount {
        /// Product identifier
        id: String,

        /// Raw discount value
        value: Value,
    },

    /// Discount is out of range.
    #[error("Invalid discount for product {id}: {source}")]
    Discount {
        /// Product identifier
        id: String,

        /// Range error
        source: DiscountError,
    },

    /// Quantity is not a positive integer.
    #[error("Invalid quantity for product {id}: {value}")]
    InvalidQuantity {
        /// Product identifier
        id: String,

        /// Raw quantity value
        value: Value,
    },

    /// Cart line refers to an unknown product.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Cart line could not be added.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// A product row as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    /// Store identifier
    pub id: Value,

    /// Display name
    pub name: String,

    /// Base unit price in major units
    pub price: Value,

    /// Discount in percent points
    #[serde(default)]
    pub discount_percentage: Option<Value>,

    /// Stored combo offer JSON
    #[serde(default)]
    pub combo_offers: Option<Value>,
}

/// A combo offer entry inside the stored JSON.
#[derive(Debug, Deserialize)]
struct ComboOfferRecord {
    quantity: Value,
    price: Value,
}

/// A cart row as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineRecord {
    /// Store identifier of the product
    pub product_id: Value,

    /// Units in the line
    pub quantity: Value,

    /// Chosen size
    #[serde(default)]
    pub selected_size: Option<String>,

    /// Chosen colour
    #[serde(default)]
    pub selected_color: Option<String>,

    /// Whether the line is selected for checkout; absent means selected
    #[serde(default)]
    pub selected_for_checkout: Option<bool>,
}

impl ProductRecord {
    /// Store identifier as a string.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidId`] if the identifier is not a string or number.
    pub fn id(&self) -> Result<String, RecordError> {
        id_from_value(&self.id)
    }

    /// Parse into a typed product priced in `currency`.
    ///
    /// Returns the product alongside its store identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the identifier, price or discount is malformed.
    pub fn into_product<'a>(
        self,
        currency: &'static Currency,
    ) -> Result<(String, Product<'a>), RecordError> {
        let id = self.id()?;

        let price = money_from_value(&self.price, currency)
            .filter(|price| price.to_minor_units() >= 0)
            .ok_or_else(|| RecordError::InvalidPrice {
                id: id.clone(),
                value: self.price.clone(),
            })?;

        let discount = match self.discount_percentage.filter(|value| !value.is_null()) {
            None => None,
            Some(value) => {
                let points =
                    decimal_from_value(&value).ok_or_else(|| RecordError::InvalidDiscount {
                        id: id.clone(),
                        value: value.clone(),
                    })?;

                discount_from_points(points).map_err(|source| RecordError::Discount {
                    id: id.clone(),
                    source,
                })?
            }
        };

        let combo_offers = match self.combo_offers {
            Some(value) => parse_combo_offers(&id, value, currency),
            None => ComboOffers::empty(),
        };

        let product = Product {
            name: self.name,
            price,
            discount,
            combo_offers,
        };

        Ok((id, product))
    }
}

impl CartLineRecord {
    /// Parse into a cart line, resolving the product through `catalog`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the product is unknown or the quantity is not
    /// a positive integer.
    pub fn into_line(self, catalog: &Catalog<'_>) -> Result<CartLine, RecordError> {
        let id = id_from_value(&self.product_id)?;

        let product = catalog
            .key_for(&id)
            .ok_or_else(|| RecordError::UnknownProduct(id.clone()))?;

        let quantity = self
            .quantity
            .as_u64()
            .and_then(|quantity| u32::try_from(quantity).ok())
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| RecordError::InvalidQuantity {
                id,
                value: self.quantity.clone(),
            })?;

        let mut line =
            CartLine::new(product, quantity).with_selected(self.selected_for_checkout.unwrap_or(true));

        if let Some(size) = self.selected_size {
            line = line.with_size(size);
        }

        if let Some(color) = self.selected_color {
            line = line.with_color(color);
        }

        Ok(line)
    }
}

/// Parse a JSON array of product rows into a catalog.
///
/// # Errors
///
/// Returns a [`RecordError`] if the JSON or any row is malformed.
pub fn parse_products<'a>(
    json: &str,
    currency: &'static Currency,
) -> Result<Catalog<'a>, RecordError> {
    let records: Vec<ProductRecord> = serde_json::from_str(json)?;
    let mut catalog = Catalog::new();

    for record in records {
        let (id, product) = record.into_product(currency)?;

        catalog.insert(id, product);
    }

    Ok(catalog)
}

/// Parse a JSON array of cart rows into a cart.
///
/// # Errors
///
/// Returns a [`RecordError`] if the JSON or any row is malformed.
pub fn parse_cart(
    json: &str,
    catalog: &Catalog<'_>,
    currency: &'static Currency,
) -> Result<Cart, RecordError> {
    let records: Vec<CartLineRecord> = serde_json::from_str(json)?;
    let mut cart = Cart::new(currency);

    for record in records {
        cart.add(record.into_line(catalog)?)?;
    }

    Ok(cart)
}

fn parse_combo_offers<'a>(id: &str, value: Value, currency: &'static Currency) -> ComboOffers<'a> {
    match try_parse_combo_offers(value, currency) {
        Ok(offers) => offers,
        Err(reason) => {
            tracing::warn!(product = id, %reason, "ignoring malformed combo offers");

            ComboOffers::empty()
        }
    }
}

fn try_parse_combo_offers<'a>(
    value: Value,
    currency: &'static Currency,
) -> Result<ComboOffers<'a>, String> {
    let value = match value {
        Value::Null => return Ok(ComboOffers::empty()),
        Value::String(encoded) if encoded.trim().is_empty() => return Ok(ComboOffers::empty()),
        Value::String(encoded) => serde_json::from_str(&encoded).map_err(|err| err.to_string())?,
        other => other,
    };

    let records: Vec<ComboOfferRecord> =
        serde_json::from_value(value).map_err(|err| err.to_string())?;

    let offers = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let quantity = record
                .quantity
                .as_u64()
                .or_else(|| record.quantity.as_str()?.trim().parse().ok())
                .and_then(|quantity| u32::try_from(quantity).ok())
                .ok_or_else(|| format!("offer {index} has invalid quantity {}", record.quantity))?;

            let price = money_from_value(&record.price, currency)
                .ok_or_else(|| format!("offer {index} has invalid price {}", record.price))?;

            Ok(ComboOffer::new(quantity, price))
        })
        .collect::<Result<Vec<_>, String>>()?;

    ComboOffers::new(offers, currency).map_err(|err| err.to_string())
}

fn id_from_value(value: &Value) -> Result<String, RecordError> {
    match value {
        Value::String(id) => Ok(id.clone()),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(RecordError::InvalidId(other.clone())),
    }
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };

    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

// Store prices are major units of the cart currency.
fn money_from_value(value: &Value, currency: &'static Currency) -> Option<Money<'static, Currency>> {
    let minor_units = minor_units_of(decimal_from_value(value)?, currency)?;

    Some(Money::from_minor(minor_units, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, JPY};
    use serde_json::json;
    use testresult::TestResult;

    use crate::cart::Selection;

    use super::*;

    fn product_record(value: Value) -> Result<ProductRecord, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn product_with_array_offers() -> TestResult {
        let record = product_record(json!({
            "id": 7,
            "name": "Pique Polo",
            "price": 100,
            "discount_percentage": 5,
            "combo_offers": [
                { "quantity": 50, "price": 80 },
                { "quantity": 10, "price": "90.00" }
            ]
        }))?;

        let (id, product) = record.into_product(GBP)?;

        assert_eq!(id, "7");
        assert_eq!(product.price, Money::from_minor(100_00, GBP));
        assert_eq!(product.combo_offers.len(), 2);
        assert_eq!(
            product.combo_price(20)?.final_price(),
            Money::from_minor(1_710_00, GBP)
        );

        Ok(())
    }

    #[test]
    fn product_with_encoded_offers() -> TestResult {
        let record = product_record(json!({
            "id": "polo",
            "name": "Pique Polo",
            "price": "100.00",
            "combo_offers": "[{\"quantity\": \"10\", \"price\": 90}]"
        }))?;

        let (_, product) = record.into_product(GBP)?;

        assert_eq!(
            product
                .combo_offers
                .tier_for(10)
                .map(ComboOffer::price),
            Some(Money::from_minor(90_00, GBP))
        );
        assert_eq!(product.discount, None);

        Ok(())
    }

    #[test]
    fn malformed_offers_fall_back_to_base_price() -> TestResult {
        let cases = [
            json!([{ "quantity": "lots", "price": 90 }]),
            json!([{ "quantity": 10, "price": "cheap" }]),
            json!([{ "quantity": -10, "price": 90 }]),
            json!([{ "quantity": 10, "price": -1 }]),
            json!({ "quantity": 10, "price": 90 }),
            json!("not json"),
            json!(42),
        ];

        for offers in cases {
            let record = product_record(json!({
                "id": "polo",
                "name": "Pique Polo",
                "price": 100,
                "combo_offers": offers
            }))?;

            let (_, product) = record.into_product(GBP)?;

            assert!(product.combo_offers.is_empty(), "expected no offers");
            assert_eq!(
                product.combo_price(20)?.final_price(),
                Money::from_minor(2_000_00, GBP)
            );
        }

        Ok(())
    }

    #[test]
    fn stored_zero_threshold_is_a_tier() -> TestResult {
        let record = product_record(json!({
            "id": "polo",
            "name": "Pique Polo",
            "price": 100,
            "combo_offers": [{ "quantity": 0, "price": 95 }]
        }))?;

        let (_, product) = record.into_product(GBP)?;

        assert_eq!(product.combo_offers.len(), 1);
        assert_eq!(
            product.combo_price(5)?.final_price(),
            Money::from_minor(475_00, GBP)
        );

        Ok(())
    }

    #[test]
    fn prices_scale_by_currency_exponent() -> TestResult {
        let record = product_record(json!({
            "id": "polo",
            "name": "Pique Polo",
            "price": 1500,
            "combo_offers": [{ "quantity": 10, "price": "1200" }]
        }))?;

        let (_, product) = record.into_product(JPY)?;

        assert_eq!(product.price, Money::from_minor(1_500, JPY));
        assert_eq!(
            product.combo_offers.tier_for(10).map(ComboOffer::price),
            Some(Money::from_minor(1_200, JPY))
        );

        Ok(())
    }

    #[test]
    fn prices_round_half_away_from_zero() -> TestResult {
        let record = product_record(json!({ "id": "tee", "name": "Crew Tee", "price": "0.125" }))?;

        let (_, product) = record.into_product(GBP)?;

        assert_eq!(product.price, Money::from_minor(13, GBP));

        Ok(())
    }

    #[test]
    fn null_offers_and_discount_are_empty() -> TestResult {
        let record = product_record(json!({
            "id": "tee",
            "name": "Crew Tee",
            "price": 8,
            "discount_percentage": null,
            "combo_offers": null
        }))?;

        let (_, product) = record.into_product(GBP)?;

        assert!(product.combo_offers.is_empty());
        assert_eq!(product.discount, None);

        Ok(())
    }

    #[test]
    fn invalid_price_is_an_error() -> TestResult {
        let record = product_record(json!({ "id": "tee", "name": "Crew Tee", "price": "free" }))?;

        assert!(matches!(
            record.into_product(GBP),
            Err(RecordError::InvalidPrice { id, .. }) if id == "tee"
        ));

        Ok(())
    }

    #[test]
    fn out_of_range_discount_is_an_error() -> TestResult {
        let record = product_record(json!({
            "id": "tee",
            "name": "Crew Tee",
            "price": 8,
            "discount_percentage": 150
        }))?;

        assert!(matches!(
            record.into_product(GBP),
            Err(RecordError::Discount {
                source: DiscountError::OutOfRange(_),
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn invalid_id_is_an_error() -> TestResult {
        let record = product_record(json!({ "id": [1], "name": "Crew Tee", "price": 8 }))?;

        assert!(matches!(
            record.into_product(GBP),
            Err(RecordError::InvalidId(_))
        ));

        Ok(())
    }

    #[test]
    fn cart_rows_resolve_products() -> TestResult {
        let catalog = parse_products(
            r#"[
                {"id": 1, "name": "Pique Polo", "price": 100, "combo_offers": [{"quantity": 10, "price": 90}]},
                {"id": 2, "name": "Crew Tee", "price": "8.00"}
            ]"#,
            GBP,
        )?;

        let cart = parse_cart(
            r#"[
                {"product_id": 1, "quantity": 6, "selected_size": "M", "selected_color": "navy"},
                {"product_id": "1", "quantity": 9, "selected_size": "L", "selected_for_checkout": false},
                {"product_id": 2, "quantity": 1}
            ]"#,
            &catalog,
            GBP,
        )?;

        assert_eq!(cart.len(), 3);
        assert_eq!(
            cart.get(0)?.color(),
            Some("navy"),
            "colour should carry over"
        );
        assert!(!cart.get(1)?.is_selected());
        assert_eq!(cart.quantities(Selection::All)?.len(), 2);

        Ok(())
    }

    #[test]
    fn cart_row_with_unknown_product_is_an_error() -> TestResult {
        let catalog = Catalog::new();

        let result = parse_cart(r#"[{"product_id": 9, "quantity": 1}]"#, &catalog, GBP);

        assert!(matches!(result, Err(RecordError::UnknownProduct(id)) if id == "9"));

        Ok(())
    }

    #[test]
    fn cart_row_with_bad_quantity_is_an_error() -> TestResult {
        let catalog = parse_products(r#"[{"id": 1, "name": "Crew Tee", "price": 8}]"#, GBP)?;

        for quantity in ["0", "-2", "1.5", "\"three\""] {
            let json = format!(r#"[{{"product_id": 1, "quantity": {quantity}}}]"#);

            assert!(
                matches!(
                    parse_cart(&json, &catalog, GBP),
                    Err(RecordError::InvalidQuantity { .. })
                ),
                "quantity {quantity} should be rejected"
            );
        }

        Ok(())
    }
}
