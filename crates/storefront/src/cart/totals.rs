//! Cart pricing: joining the cart against the catalog.
//!
//! All money amounts are `rust_decimal::Decimal`; no floats anywhere near
//! a price. Cart lines whose product is missing from the catalog snapshot
//! contribute nothing to the subtotal or the item count - the catalog the
//! shopper sees and the totals they are quoted come from the same data.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use marigold_core::ProductId;

use crate::commerce::types::{OrderLine, Product};

use super::CartState;

/// Flat delivery fee added to every quote, including an empty cart's.
/// Route handlers reject empty carts before an order is placed.
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Derived cart totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Sum of `unit price x quantity` over resolvable lines.
    pub subtotal: Decimal,
    /// Total unit count over resolvable lines.
    pub item_count: u64,
    /// Flat delivery fee.
    pub delivery_fee: Decimal,
    /// `subtotal + delivery_fee`.
    pub total: Decimal,
}

/// Price a cart against a catalog snapshot.
#[must_use]
pub fn calculate(cart: &CartState, catalog: &[Product]) -> CartTotals {
    let by_id = index_catalog(catalog);

    let mut subtotal = Decimal::ZERO;
    let mut item_count: u64 = 0;

    for (product_id, _, quantity) in cart.lines() {
        let Some(product) = by_id.get(product_id) else {
            // Unresolvable line: not priced, not counted.
            continue;
        };
        subtotal += product.price * Decimal::from(quantity);
        item_count += u64::from(quantity);
    }

    CartTotals {
        subtotal,
        item_count,
        delivery_fee: DELIVERY_FEE,
        total: subtotal + DELIVERY_FEE,
    }
}

/// Flatten a cart into order lines, joining each line with its catalog
/// price. Lines whose product cannot be resolved are skipped, mirroring
/// [`calculate`].
#[must_use]
pub fn order_lines(cart: &CartState, catalog: &[Product]) -> Vec<OrderLine> {
    let by_id = index_catalog(catalog);

    cart.lines()
        .filter_map(|(product_id, size, quantity)| {
            by_id.get(product_id).map(|product| OrderLine {
                product: product_id.clone(),
                quantity,
                price: product.price,
                size: size.to_owned(),
            })
        })
        .collect()
}

fn index_catalog(catalog: &[Product]) -> HashMap<&ProductId, &Product> {
    catalog.iter().map(|p| (&p.id, p)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            price: Decimal::new(price, 0),
            image: vec![],
            description: None,
            sizes: vec!["S".into(), "M".into(), "L".into()],
            bestseller: false,
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = calculate(&CartState::default(), &[product("p1", 100)]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.total, DELIVERY_FEE);
    }

    #[test]
    fn test_totals_sum_across_sizes() {
        let mut cart = CartState::default();
        cart.add_line(&ProductId::from("p1"), "M", 2);
        cart.add_line(&ProductId::from("p1"), "L", 1);
        let totals = calculate(&cart, &[product("p1", 500)]);
        assert_eq!(totals.subtotal, Decimal::new(1500, 0));
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.total, Decimal::new(1510, 0));
    }

    #[test]
    fn test_unresolvable_lines_are_skipped_entirely() {
        let mut cart = CartState::default();
        cart.add_line(&ProductId::from("p1"), "M", 2);
        cart.add_line(&ProductId::from("gone"), "M", 7);
        let totals = calculate(&cart, &[product("p1", 500)]);
        // The missing product contributes to neither the subtotal nor the count.
        assert_eq!(totals.subtotal, Decimal::new(1000, 0));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn test_total_is_subtotal_plus_fee() {
        let mut cart = CartState::default();
        cart.add_line(&ProductId::from("p1"), "S", 1);
        let totals = calculate(&cart, &[product("p1", 199)]);
        assert_eq!(totals.total, totals.subtotal + totals.delivery_fee);
    }

    #[test]
    fn test_order_lines_join_catalog_price() {
        let mut cart = CartState::default();
        cart.add_line(&ProductId::from("p1"), "M", 2);
        cart.add_line(&ProductId::from("gone"), "S", 1);
        let lines = order_lines(&cart, &[product("p1", 250)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product, ProductId::from("p1"));
        assert_eq!(lines[0].price, Decimal::new(250, 0));
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].size, "M");
    }

    #[test]
    fn test_decimal_prices_stay_exact() {
        let mut cart = CartState::default();
        cart.add_line(&ProductId::from("p1"), "M", 3);
        let mut p = product("p1", 0);
        p.price = Decimal::new(1999, 2); // 19.99
        let totals = calculate(&cart, &[p]);
        assert_eq!(totals.subtotal, Decimal::new(5997, 2));
    }
}
