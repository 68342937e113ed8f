//! Combo pricing properties.
//!
//! Uses a polo priced at £100.00 with tiers of 10 units at £90.00 and 50 units
//! at £80.00, discounted by 5%:
//!
//! - 20 units reach the 10-unit tier: 20 x £90.00 = £1,800.00, less 5% = £1,710.00
//! - 5 units reach no tier: 5 x £100.00 = £500.00, less 5% = £475.00
//! - 0 units cost nothing
//!
//! Cart lines for the same product are grouped before pricing, so 6 + 9 units
//! are priced as 15 and reach the 10-unit tier that neither line reaches alone.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, GBP},
};
use testresult::TestResult;

use stitch::prelude::*;

fn gbp(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, GBP)
}

fn polo_tiers() -> Result<ComboOffers<'static>, Box<dyn std::error::Error>> {
    Ok(ComboOffers::new(
        [
            ComboOffer::new(10, gbp(90_00)),
            ComboOffer::new(50, gbp(80_00)),
        ],
        GBP,
    )?)
}

fn five_percent() -> Result<Percentage, Box<dyn std::error::Error>> {
    discount_from_points(Decimal::from(5))?.ok_or_else(|| "expected a discount".into())
}

#[test]
fn twenty_units_reach_first_tier() -> TestResult {
    let tiers = polo_tiers()?;
    let discount = five_percent()?;

    let price = calculate_combo_price(20, gbp(100_00), &tiers, Some(&discount))?;

    assert_eq!(price.matched_tier().map(ComboOffer::quantity), Some(10));
    assert_eq!(price.unit_price(), gbp(90_00));
    assert_eq!(price.subtotal(), gbp(1_800_00));
    assert_eq!(price.final_price(), gbp(1_710_00));

    Ok(())
}

#[test]
fn five_units_use_base_price() -> TestResult {
    let tiers = polo_tiers()?;
    let discount = five_percent()?;

    let price = calculate_combo_price(5, gbp(100_00), &tiers, Some(&discount))?;

    assert!(price.matched_tier().is_none());
    assert_eq!(price.subtotal(), gbp(500_00));
    assert_eq!(price.final_price(), gbp(475_00));

    Ok(())
}

#[test]
fn zero_units_cost_nothing() -> TestResult {
    let tiers = polo_tiers()?;
    let discount = five_percent()?;

    let price = calculate_combo_price(0, gbp(100_00), &tiers, Some(&discount))?;

    assert_eq!(price.final_price(), gbp(0));
    assert_eq!(price.discount(), gbp(0));

    Ok(())
}

#[test]
fn prices_follow_reached_tier() -> TestResult {
    let tiers = polo_tiers()?;
    let discount = five_percent()?;

    for quantity in 1..=120_u32 {
        let unit_minor = match quantity {
            0..10 => 100_00,
            10..50 => 90_00,
            _ => 80_00,
        };

        let subtotal = i64::from(quantity) * unit_minor;
        let expected = subtotal - subtotal * 5 / 100;

        let price = calculate_combo_price(quantity, gbp(100_00), &tiers, Some(&discount))?;

        assert_eq!(price.final_price(), gbp(expected), "quantity {quantity}");
    }

    Ok(())
}

#[test]
fn single_tier_price_never_decreases() -> TestResult {
    let tiers = ComboOffers::new([ComboOffer::new(10, gbp(90_00))], GBP)?;
    let discount = five_percent()?;

    let mut previous = 0;

    for quantity in 0..=60_u32 {
        let price = calculate_combo_price(quantity, gbp(100_00), &tiers, Some(&discount))?;
        let minor = price.final_price().to_minor_units();

        assert!(
            minor >= previous,
            "quantity {quantity} priced below quantity {}",
            quantity.saturating_sub(1)
        );

        previous = minor;
    }

    Ok(())
}

#[test]
fn steep_tier_can_undercut_smaller_order() -> TestResult {
    let tiers = polo_tiers()?;

    let forty_nine = calculate_combo_price(49, gbp(100_00), &tiers, None)?;
    let fifty = calculate_combo_price(50, gbp(100_00), &tiers, None)?;

    assert_eq!(forty_nine.final_price(), gbp(4_410_00));
    assert_eq!(fifty.final_price(), gbp(4_000_00));

    Ok(())
}

#[test]
fn grouped_lines_price_as_one_quantity() -> TestResult {
    let tiers = polo_tiers()?;
    let discount = five_percent()?;

    let mut polo = Product::new("Pique Polo Shirt", gbp(100_00));

    polo.discount = Some(discount);
    polo.combo_offers = tiers.clone();

    let mut catalog = Catalog::new();
    let polo = catalog.insert("polo", polo);

    let mut cart = Cart::new(GBP);

    cart.add(CartLine::new(polo, 6).with_size("M"))?;
    cart.add(CartLine::new(polo, 9).with_size("L"))?;

    let totals = CartTotals::calculate(&cart, &catalog, Selection::All)?;

    let grouped = calculate_combo_price(15, gbp(100_00), &tiers, Some(&discount))?;
    let six = calculate_combo_price(6, gbp(100_00), &tiers, Some(&discount))?;
    let nine = calculate_combo_price(9, gbp(100_00), &tiers, Some(&discount))?;
    let per_line = six.final_price().add(nine.final_price())?;

    assert_eq!(totals.products().len(), 1);
    assert_eq!(totals.total(), grouped.final_price());
    assert_eq!(totals.total(), gbp(1_282_50));
    assert_ne!(totals.total(), per_line);
    assert_eq!(per_line, gbp(1_425_00));

    Ok(())
}
