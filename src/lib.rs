//! Stitch
//!
//! Stitch is the tiered pricing and cart totalling engine behind a garment
//! export storefront. Products carry a base unit price, an optional flat
//! discount and a table of combo offers (volume tiers); carts group their
//! lines by product and price each group's total quantity once.

pub mod cart;
pub mod combos;
pub mod discounts;
pub mod fixtures;
pub mod inventory;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod records;
pub mod session;
pub mod utils;
