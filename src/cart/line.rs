//! Cart Lines

use crate::products::ProductKey;

/// One chosen product variant (size and colour) and its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product: ProductKey,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
    selected: bool,
}

impl CartLine {
    /// Create a line with no size or colour, selected for checkout.
    #[must_use]
    pub fn new(product: ProductKey, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            size: None,
            color: None,
            selected: true,
        }
    }

    /// Set the chosen size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Set the chosen colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set whether the line is selected for checkout.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Returns the product of the line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the quantity of the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the chosen size, if any
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Returns the chosen colour, if any
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Whether the line is included in the checkout total
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether both lines are the same product in the same size and colour.
    pub fn same_variant(&self, other: &Self) -> bool {
        self.product == other.product && self.size == other.size && self.color == other.color
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_line_is_selected_without_variant() {
        let line = CartLine::new(ProductKey::default(), 2);

        assert!(line.is_selected());
        assert_eq!(line.size(), None);
        assert_eq!(line.color(), None);
        assert_eq!(line.quantity(), 2);
    }

    #[test]
    fn same_variant_compares_size_and_color() {
        let product = ProductKey::default();
        let medium_navy = CartLine::new(product, 1).with_size("M").with_color("navy");

        assert!(medium_navy.same_variant(&CartLine::new(product, 5).with_size("M").with_color("navy")));
        assert!(!medium_navy.same_variant(&CartLine::new(product, 1).with_size("L").with_color("navy")));
        assert!(!medium_navy.same_variant(&CartLine::new(product, 1).with_size("M")));
    }
}
