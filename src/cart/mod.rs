//! Cart
//!
//! A user's cart. Lines are product variants; pricing works on products, so
//! [`Cart::quantities`] folds the variants of each product into one total
//! quantity before anything is priced. Combo tiers reward the volume of a
//! product, not of a single size or colour.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::ProductKey;

pub mod line;
pub mod service;

use line::CartLine;

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line was not found in the cart.
    #[error("Line {0} not found")]
    LineNotFound(usize),

    /// A line was added with no units.
    #[error("Cannot add a line with zero quantity")]
    ZeroQuantity,

    /// Merging a line pushed its quantity past `u32::MAX`.
    #[error("Line {0} quantity overflowed")]
    QuantityOverflow(usize),

    /// The lines of one product add up to more than `u32::MAX`.
    #[error("Total quantity of product {0:?} overflowed")]
    ProductQuantityOverflow(ProductKey),
}

/// Which lines contribute to a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every line in the cart.
    All,

    /// Only lines selected for checkout.
    Checkout,
}

impl Selection {
    /// Whether `line` is part of this selection.
    pub fn includes(self, line: &CartLine) -> bool {
        match self {
            Selection::All => true,
            Selection::Checkout => line.is_selected(),
        }
    }
}

/// Summed quantity per product, in order of first appearance in the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuantities {
    quantities: SmallVec<[(ProductKey, u32); 8]>,
}

impl ProductQuantities {
    /// Total quantity of `product`, if it appears.
    pub fn get(&self, product: ProductKey) -> Option<u32> {
        self.quantities
            .iter()
            .find(|(key, _)| *key == product)
            .map(|(_, quantity)| *quantity)
    }

    /// Iterate over `(product, total quantity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, u32)> + '_ {
        self.quantities.iter().copied()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Whether no products were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add a line, merging it into an existing line of the same variant.
    ///
    /// A merged line keeps its existing checkout selection. Returns the index of
    /// the line holding the units.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the line has no units.
    /// - [`CartError::QuantityOverflow`]: merging overflowed the line quantity.
    pub fn add(&mut self, line: CartLine) -> Result<usize, CartError> {
        if line.quantity() == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let existing = self
            .lines
            .iter_mut()
            .enumerate()
            .find(|(_, existing)| existing.same_variant(&line));

        if let Some((index, existing)) = existing {
            let quantity = existing
                .quantity()
                .checked_add(line.quantity())
                .ok_or(CartError::QuantityOverflow(index))?;

            existing.set_quantity(quantity);

            return Ok(index);
        }

        self.lines.push(line);

        Ok(self.lines.len() - 1)
    }

    /// Change the quantity of a line, returning its previous quantity.
    ///
    /// Setting a quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `index`.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return self.remove(index).map(|line| line.quantity());
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?;

        let previous = line.quantity();

        line.set_quantity(quantity);

        Ok(previous)
    }

    /// Select or deselect a line for checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `index`.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<(), CartError> {
        self.lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?
            .set_selected(selected);

        Ok(())
    }

    /// Flip the checkout selection of a line, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `index`.
    pub fn toggle_selected(&mut self, index: usize) -> Result<bool, CartError> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?;

        let selected = !line.is_selected();

        line.set_selected(selected);

        Ok(selected)
    }

    /// Select or deselect every line.
    pub fn select_all(&mut self, selected: bool) {
        for line in &mut self.lines {
            line.set_selected(selected);
        }
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::LineNotFound(index));
        }

        Ok(self.lines.remove(index))
    }

    /// Remove every line, returning them.
    pub fn clear(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if there is no line at `index`.
    pub fn get(&self, index: usize) -> Result<&CartLine, CartError> {
        self.lines.get(index).ok_or(CartError::LineNotFound(index))
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Sum the quantities of the lines in `selection`, per product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductQuantityOverflow`] if a product's lines add
    /// up to more than `u32::MAX`.
    pub fn quantities(&self, selection: Selection) -> Result<ProductQuantities, CartError> {
        let mut positions = FxHashMap::<ProductKey, usize>::default();
        let mut quantities = SmallVec::<[(ProductKey, u32); 8]>::new();

        for line in self.lines.iter().filter(|line| selection.includes(line)) {
            match positions
                .get(&line.product())
                .and_then(|&position| quantities.get_mut(position))
            {
                Some((product, total)) => {
                    *total = total
                        .checked_add(line.quantity())
                        .ok_or(CartError::ProductQuantityOverflow(*product))?;
                }
                None => {
                    positions.insert(line.product(), quantities.len());
                    quantities.push((line.product(), line.quantity()));
                }
            }
        }

        Ok(ProductQuantities { quantities })
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
