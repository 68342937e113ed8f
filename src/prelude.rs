//! Stitch prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, ProductQuantities, Selection,
        line::CartLine,
        service::{CartService, CartServiceError},
    },
    combos::{ComboOffer, ComboOffers, ComboOffersError},
    discounts::{DiscountError, discount_from_points, percent_of_minor},
    fixtures::{Fixture, FixtureError},
    inventory::{InMemoryInventory, Inventory, InventoryError},
    pricing::{ComboPrice, PricingError, calculate_combo_price},
    products::{Catalog, Product, ProductKey},
    receipt::{CartTotals, ProductTotal, ReceiptError},
    records::{CartLineRecord, ProductRecord, RecordError},
    session::{Permissions, Session, SessionError, SessionUser},
};
