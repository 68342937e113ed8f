//! Utils

use std::path::PathBuf;

use clap::Parser;

use crate::{inventory::InMemoryInventory, products::Catalog};

/// Arguments for the cart examples
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to use for the products & cart
    #[clap(short, long, default_value = "garments")]
    pub fixture: String,

    /// Directory holding the fixture sets
    #[clap(short, long, env = "STITCH_FIXTURES", default_value = "./fixtures")]
    pub base_path: PathBuf,

    /// Only print totals for lines selected for checkout
    #[clap(short, long)]
    pub checkout: bool,

    /// Units of stock to hold for every product
    #[clap(short, long, default_value_t = 100)]
    pub stock: u32,
}

/// Create an inventory holding `units` of every product in the catalog.
pub fn stocked_inventory(catalog: &Catalog<'_>, units: u32) -> InMemoryInventory {
    let mut inventory = InMemoryInventory::new();

    for (product, _) in catalog.iter() {
        inventory.set_stock(product, units);
    }

    inventory
}
