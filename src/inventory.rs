//! Inventory
//!
//! Stock reservation seam. Adding units to a cart reserves them, taking them
//! out releases them. The storefront's real implementation is a pair of stored
//! procedures in the hosted database; [`InMemoryInventory`] is the local
//! stand-in used by the demo and tests.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::products::ProductKey;

/// Errors returned by an [`Inventory`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The product has no stock record.
    #[error("Product {0:?} is not stocked")]
    UnknownProduct(ProductKey),

    /// Not enough stock available to reserve.
    #[error("Cannot reserve {requested} of {product:?}; {available} available")]
    Insufficient {
        /// Product being reserved
        product: ProductKey,

        /// Units requested
        requested: u32,

        /// Units available
        available: u32,
    },

    /// Releasing more than is reserved.
    #[error("Cannot release {requested} of {product:?}; {reserved} reserved")]
    OverRelease {
        /// Product being released
        product: ProductKey,

        /// Units requested
        requested: u32,

        /// Units currently reserved
        reserved: u32,
    },
}

/// Reserve and release product stock.
#[cfg_attr(test, mockall::automock)]
pub trait Inventory {
    /// Reserve `quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Returns an [`InventoryError`] if the units cannot be reserved.
    fn reserve(&mut self, product: ProductKey, quantity: u32) -> Result<(), InventoryError>;

    /// Release `quantity` previously reserved units of `product`.
    ///
    /// # Errors
    ///
    /// Returns an [`InventoryError`] if the units cannot be released.
    fn release(&mut self, product: ProductKey, quantity: u32) -> Result<(), InventoryError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Stock {
    available: u32,
    reserved: u32,
}

/// In-process stock levels.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    stock: FxHashMap<ProductKey, Stock>,
}

impl InMemoryInventory {
    /// Create an inventory with no stocked products.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the available stock of a product, clearing any reservations.
    pub fn set_stock(&mut self, product: ProductKey, available: u32) -> &mut Self {
        self.stock.insert(
            product,
            Stock {
                available,
                reserved: 0,
            },
        );

        self
    }

    /// Units of `product` still available.
    pub fn available(&self, product: ProductKey) -> Option<u32> {
        self.stock.get(&product).map(|stock| stock.available)
    }

    /// Units of `product` currently reserved.
    pub fn reserved(&self, product: ProductKey) -> Option<u32> {
        self.stock.get(&product).map(|stock| stock.reserved)
    }
}

impl Inventory for InMemoryInventory {
    fn reserve(&mut self, product: ProductKey, quantity: u32) -> Result<(), InventoryError> {
        let stock = self
            .stock
            .get_mut(&product)
            .ok_or(InventoryError::UnknownProduct(product))?;

        if stock.available < quantity {
            return Err(InventoryError::Insufficient {
                product,
                requested: quantity,
                available: stock.available,
            });
        }

        stock.available -= quantity;
        stock.reserved = stock.reserved.saturating_add(quantity);

        tracing::trace!(?product, quantity, available = stock.available, "reserved stock");

        Ok(())
    }

    fn release(&mut self, product: ProductKey, quantity: u32) -> Result<(), InventoryError> {
        let stock = self
            .stock
            .get_mut(&product)
            .ok_or(InventoryError::UnknownProduct(product))?;

        if stock.reserved < quantity {
            return Err(InventoryError::OverRelease {
                product,
                requested: quantity,
                reserved: stock.reserved,
            });
        }

        stock.reserved -= quantity;
        stock.available = stock.available.saturating_add(quantity);

        tracing::trace!(?product, quantity, available = stock.available, "released stock");

        Ok(())
    }
}
