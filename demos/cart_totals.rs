//! Cart Totals Example
//!
//! Loads a fixture set into a session cart, reserving stock for every line,
//! and prints the combo-priced totals for the whole cart and for checkout.
//!
//! Use `-f` to load a fixture set by name
//! Use `-b` (or `STITCH_FIXTURES`) to point at another fixtures directory
//! Use `-c` to print only the checkout totals
//! Set `RUST_LOG=stitch=debug` to see pricing and stock events

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stitch::{
    cart::{Cart, Selection, service::CartService},
    fixtures::Fixture,
    receipt::CartTotals,
    session::{Permissions, Session, SessionUser},
    utils::{ExampleCartArgs, stocked_inventory},
};

/// Cart Totals Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| "stitch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ExampleCartArgs::parse();

    let fixture = Fixture::from_set_in(&args.base_path, &args.fixture)?;
    let catalog = fixture.catalog();

    let mut service = CartService::new(
        Cart::new(fixture.currency()?),
        stocked_inventory(catalog, args.stock),
    );

    for line in fixture.lines() {
        service.add_item(line.clone())?;
    }

    let (cart, _inventory) = service.into_parts();

    let session = Session::with_cart(
        SessionUser::new("demo"),
        Permissions::from_strs(&["cart.read", "cart.write"]),
        cart,
    );

    session.require("cart.read")?;

    let selections: &[Selection] = if args.checkout {
        &[Selection::Checkout]
    } else {
        &[Selection::All, Selection::Checkout]
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for &selection in selections {
        println!("\n{selection:?}");

        CartTotals::calculate(session.cart(), catalog, selection)?.write_to(&mut handle, catalog)?;
    }

    session.teardown();

    Ok(())
}
