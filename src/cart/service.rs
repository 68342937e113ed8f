//! Cart service.
//!
//! Keeps a cart and its stock reservations in step. Stock is reserved before
//! the cart grows and released after it shrinks, so a failed reservation never
//! leaves unreserved units in the cart.

use thiserror::Error;

use crate::{
    cart::{Cart, CartError, line::CartLine},
    inventory::{Inventory, InventoryError},
};

/// Errors raised by [`CartService`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartServiceError {
    /// Cart mutation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Stock reservation or release failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// A cart backed by an [`Inventory`].
#[derive(Debug)]
pub struct CartService<I> {
    cart: Cart,
    inventory: I,
}

impl<I: Inventory> CartService<I> {
    /// Wrap a cart whose lines are already reserved in `inventory`.
    pub fn new(cart: Cart, inventory: I) -> Self {
        Self { cart, inventory }
    }

    /// Reserve stock for a line, then add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartServiceError`] if the line is empty, stock cannot be
    /// reserved, or merging the line overflows its quantity. Nothing stays
    /// reserved when an error is returned.
    pub fn add_item(&mut self, line: CartLine) -> Result<usize, CartServiceError> {
        if line.quantity() == 0 {
            return Err(CartError::ZeroQuantity.into());
        }

        let (product, quantity) = (line.product(), line.quantity());

        self.inventory.reserve(product, quantity)?;

        match self.cart.add(line) {
            Ok(index) => Ok(index),
            Err(error) => {
                if let Err(release_error) = self.inventory.release(product, quantity) {
                    tracing::warn!(
                        ?product,
                        quantity,
                        cart_error = %error,
                        %release_error,
                        "failed to release stock after cart add failed"
                    );

                    return Err(release_error.into());
                }

                Err(error.into())
            }
        }
    }

    /// Change the quantity of a line, reserving or releasing the difference.
    ///
    /// A quantity of zero removes the line and releases all of its units.
    ///
    /// # Errors
    ///
    /// Returns a [`CartServiceError`] if the line does not exist or the stock
    /// change fails; the cart is left unchanged in either case.
    pub fn update_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartServiceError> {
        let line = self.cart.get(index)?;
        let (product, current) = (line.product(), line.quantity());

        if quantity > current {
            self.inventory.reserve(product, quantity - current)?;
            self.cart.set_quantity(index, quantity)?;
        } else if quantity < current {
            self.inventory.release(product, current - quantity)?;
            self.cart.set_quantity(index, quantity)?;
        }

        Ok(())
    }

    /// Flip the checkout selection of a line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartServiceError`] if the line does not exist.
    pub fn toggle_selected(&mut self, index: usize) -> Result<bool, CartServiceError> {
        Ok(self.cart.toggle_selected(index)?)
    }

    /// Release a line's stock and remove it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartServiceError`] if the line does not exist or its stock
    /// cannot be released.
    pub fn remove_item(&mut self, index: usize) -> Result<CartLine, CartServiceError> {
        let line = self.cart.get(index)?;

        self.inventory.release(line.product(), line.quantity())?;

        Ok(self.cart.remove(index)?)
    }

    /// Empty the cart, releasing every line's stock.
    ///
    /// Every line is released even if an earlier release fails.
    ///
    /// # Errors
    ///
    /// Returns the first release failure.
    pub fn clear(&mut self) -> Result<(), CartServiceError> {
        let mut first_error = None;

        for line in self.cart.clear() {
            if let Err(error) = self.inventory.release(line.product(), line.quantity()) {
                tracing::warn!(
                    product = ?line.product(),
                    quantity = line.quantity(),
                    %error,
                    "failed to release stock while clearing cart"
                );

                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// The cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The inventory.
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Split the service back into its cart and inventory.
    pub fn into_parts(self) -> (Cart, I) {
        (self.cart, self.inventory)
    }
}
