//! Pricing reconciliation between the cart and the catalog.

use marigold_integration_tests::product;
use marigold_storefront::cart::{CartState, DELIVERY_FEE, calculate, order_lines};

use marigold_core::ProductId;
use rust_decimal::Decimal;

#[test]
fn test_basic_totals() {
    let mut cart = CartState::default();
    cart.add_line(&ProductId::from("p1"), "M", 2);

    let totals = calculate(&cart, &[product("p1", 500)]);

    assert_eq!(totals.subtotal, Decimal::new(1000, 0));
    assert_eq!(totals.item_count, 2);
    assert_eq!(totals.delivery_fee, Decimal::new(10, 0));
    assert_eq!(totals.total, Decimal::new(1010, 0));
}

#[test]
fn test_missing_product_is_excluded_from_subtotal_and_count() {
    let mut cart = CartState::default();
    cart.add_line(&ProductId::from("p1"), "M", 2);
    cart.add_line(&ProductId::from("p2"), "L", 5);

    // p2 has been removed from the catalog since it was added to the cart.
    let totals = calculate(&cart, &[product("p1", 500)]);

    assert_eq!(totals.subtotal, Decimal::new(1000, 0));
    assert_eq!(totals.item_count, 2);
}

#[test]
fn test_total_is_always_subtotal_plus_delivery_fee() {
    let carts: Vec<CartState> = vec![
        CartState::default(),
        {
            let mut c = CartState::default();
            c.add_line(&ProductId::from("p1"), "S", 1);
            c
        },
        {
            let mut c = CartState::default();
            c.add_line(&ProductId::from("p1"), "S", 3);
            c.add_line(&ProductId::from("p2"), "M", 2);
            c
        },
    ];
    let catalog = [product("p1", 199), product("p2", 350)];

    for cart in &carts {
        let totals = calculate(cart, &catalog);
        assert_eq!(totals.total, totals.subtotal + DELIVERY_FEE);
    }
}

#[test]
fn test_order_lines_skip_unresolvable_products() {
    let mut cart = CartState::default();
    cart.add_line(&ProductId::from("p1"), "M", 2);
    cart.add_line(&ProductId::from("gone"), "S", 1);

    let lines = order_lines(&cart, &[product("p1", 500)]);

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product, ProductId::from("p1"));
    assert_eq!(lines[0].price, Decimal::new(500, 0));
}

#[test]
fn test_order_lines_and_totals_agree() {
    let mut cart = CartState::default();
    cart.add_line(&ProductId::from("p1"), "M", 2);
    cart.add_line(&ProductId::from("p2"), "L", 1);
    cart.add_line(&ProductId::from("gone"), "S", 9);
    let catalog = [product("p1", 500), product("p2", 250)];

    let totals = calculate(&cart, &catalog);
    let lines = order_lines(&cart, &catalog);

    let line_sum: Decimal = lines
        .iter()
        .map(|l| l.price * Decimal::from(l.quantity))
        .sum();
    assert_eq!(line_sum, totals.subtotal);
}
