//! Receipt
//!
//! Cart totals. The running cart total and the checkout total are the same
//! calculation over different [`Selection`]s: group lines by product, price
//! each product's total quantity once, then add the groups up.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, Selection},
    discounts::percent_points,
    pricing::{ComboPrice, PricingError},
    products::{Catalog, ProductKey},
};

/// Errors that can occur when totalling a cart.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A cart line refers to a product missing from the catalog.
    #[error("Missing product {0:?}")]
    MissingProduct(ProductKey),

    /// A product is priced in a different currency than the cart (product currency, cart currency).
    #[error("Product is priced in {0}, but cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Grouping the cart lines failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Pricing a product group failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Base price subtotal left the minor-unit range.
    #[error("Base price subtotal overflowed")]
    Overflow,

    /// Writing the receipt failed.
    #[error("Failed to write receipt")]
    IO,
}

/// Price of one product group.
#[derive(Debug, Clone, Copy)]
pub struct ProductTotal<'a> {
    product: ProductKey,
    base_subtotal: Money<'a, Currency>,
    price: ComboPrice<'a>,
}

impl<'a> ProductTotal<'a> {
    /// The product priced.
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Total quantity across the product's lines.
    pub fn quantity(&self) -> u32 {
        self.price.quantity()
    }

    /// What the quantity would cost at base price with no discount.
    pub fn base_subtotal(&self) -> Money<'a, Currency> {
        self.base_subtotal
    }

    /// Combo pricing details.
    pub fn price(&self) -> &ComboPrice<'a> {
        &self.price
    }

    /// Amount charged for the group.
    pub fn final_price(&self) -> Money<'a, Currency> {
        self.price.final_price()
    }
}

/// Totals for a selection of a cart.
#[derive(Debug, Clone)]
pub struct CartTotals<'a> {
    selection: Selection,
    products: SmallVec<[ProductTotal<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> CartTotals<'a> {
    /// Total the lines of `cart` in `selection`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a product is missing or priced in another
    /// currency, or if pricing overflows.
    pub fn calculate(
        cart: &Cart,
        catalog: &Catalog<'a>,
        selection: Selection,
    ) -> Result<Self, ReceiptError> {
        let currency = cart.currency();
        let mut products = SmallVec::new();
        let mut subtotal = Money::from_minor(0, currency);
        let mut total = Money::from_minor(0, currency);

        for (key, quantity) in cart.quantities(selection)?.iter() {
            let product = catalog
                .get(key)
                .ok_or(ReceiptError::MissingProduct(key))?;

            let product_currency = product.price.currency();

            if product_currency != currency {
                return Err(ReceiptError::CurrencyMismatch(
                    product_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            let price = product.combo_price(quantity)?;

            let base_subtotal = product
                .price
                .to_minor_units()
                .checked_mul(i64::from(quantity))
                .map(|minor| Money::from_minor(minor, product_currency))
                .ok_or(ReceiptError::Overflow)?;

            subtotal = subtotal.add(base_subtotal)?;
            total = total.add(price.final_price())?;

            products.push(ProductTotal {
                product: key,
                base_subtotal,
                price,
            });
        }

        tracing::debug!(
            ?selection,
            products = products.len(),
            %total,
            "calculated cart totals"
        );

        Ok(Self {
            selection,
            products,
            subtotal,
            total,
        })
    }

    /// The selection these totals cover.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Per-product totals, in cart order.
    pub fn products(&self) -> &[ProductTotal<'a>] {
        &self.products
    }

    /// Cost at base prices, before combo tiers and discounts.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount to charge.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Savings from combo tiers and discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Savings as a fraction of the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Render the totals as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is missing or writing fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        catalog: &Catalog<'_>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Product",
            "Qty",
            "Base Price",
            "Tier",
            "Unit Price",
            "Discount",
            "Price",
        ]);

        for line in &self.products {
            let product = catalog
                .get(line.product)
                .ok_or(ReceiptError::MissingProduct(line.product))?;

            let tier = line
                .price
                .matched_tier()
                .map_or_else(String::new, |tier| format!("{}+", tier.quantity()));

            let discount = product
                .discount
                .as_ref()
                .map_or_else(String::new, |percent| {
                    format!("{}% (-{})", percent_points(percent), line.price.discount())
                });

            builder.push_record([
                product.name.clone(),
                line.quantity().to_string(),
                format!("{}", product.price),
                tier,
                format!("{}", line.price.unit_price()),
                discount,
                format!("{}", line.final_price()),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        let savings = self.savings()?;
        let savings_points = percent_points(&self.savings_percent()?);

        writeln!(out, " Subtotal:  {}", self.subtotal).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "    Total:  {}", self.total).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "  Savings:  ({savings_points:.2}%) {savings}")
            .map_err(|_err| ReceiptError::IO)?;

        Ok(())
    }
}
