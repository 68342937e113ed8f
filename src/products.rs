//! Products

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

use crate::{
    combos::ComboOffers,
    pricing::{ComboPrice, PricingError, calculate_combo_price},
};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Base unit price
    pub price: Money<'a, Currency>,

    /// Flat discount taken off every purchase of this product
    pub discount: Option<Percentage>,

    /// Volume tiers
    pub combo_offers: ComboOffers<'a>,
}

impl<'a> Product<'a> {
    /// Create a product with no discount and no combo offers.
    pub fn new(name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            price,
            discount: None,
            combo_offers: ComboOffers::empty(),
        }
    }

    /// Price `quantity` units of this product.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the amount leaves the minor-unit range.
    pub fn combo_price(&self, quantity: u32) -> Result<ComboPrice<'a>, PricingError> {
        calculate_combo_price(
            quantity,
            self.price,
            &self.combo_offers,
            self.discount.as_ref(),
        )
    }
}

/// Products keyed by [`ProductKey`], indexed by their store identifier.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    ids: FxHashMap<String, ProductKey>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product under its store identifier.
    ///
    /// Inserting an identifier that is already present replaces its product and
    /// keeps the existing key.
    pub fn insert(&mut self, id: impl Into<String>, product: Product<'a>) -> ProductKey {
        let id = id.into();

        if let Some(key) = self.ids.get(&id).copied() {
            if let Some(existing) = self.products.get_mut(key) {
                *existing = product;

                return key;
            }
        }

        let key = self.products.insert(product);

        self.ids.insert(id, key);

        key
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Look up the key of a store identifier.
    pub fn key_for(&self, id: &str) -> Option<ProductKey> {
        self.ids.get(id).copied()
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
