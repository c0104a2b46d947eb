//! Remote-synchronised cart store behaviour against the fake commerce API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use marigold_core::ProductId;
use marigold_integration_tests::FakeCommerce;
use marigold_storefront::cart::{CartError, CartStore};
use marigold_storefront::commerce::types::CartEntry;

fn pid(s: &str) -> ProductId {
    ProductId::from(s)
}

#[tokio::test]
async fn test_add_syncs_with_server_state() {
    let store = CartStore::new(FakeCommerce::new());

    let cart = store.add(&pid("p1"), "M", 2).await.unwrap();

    assert_eq!(cart.quantity(&pid("p1"), "M"), 2);
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected_before_the_backend() {
    let fake = FakeCommerce::new();
    let store = CartStore::new(fake);

    let err = store.add(&pid("p1"), "M", 0).await.unwrap_err();

    assert!(matches!(err, CartError::InvalidQuantity));
}

#[tokio::test]
async fn test_set_quantity_is_idempotent() {
    let store = CartStore::new(FakeCommerce::with_entries(vec![CartEntry {
        product: pid("p1"),
        size: "M".into(),
        quantity: 1,
    }]));

    let first = store.set_quantity(&pid("p1"), "M", 5).await.unwrap();
    let second = store.set_quantity(&pid("p1"), "M", 5).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.quantity(&pid("p1"), "M"), 5);
}

#[tokio::test]
async fn test_set_quantity_zero_equals_remove() {
    let entries = vec![CartEntry {
        product: pid("p1"),
        size: "M".into(),
        quantity: 3,
    }];

    let store_a = CartStore::new(FakeCommerce::with_entries(entries.clone()));
    let via_update = store_a.set_quantity(&pid("p1"), "M", 0).await.unwrap();

    let store_b = CartStore::new(FakeCommerce::with_entries(entries));
    let via_remove = store_b.remove(&pid("p1"), "M").await.unwrap();

    assert_eq!(via_update, via_remove);
    assert!(via_update.is_empty());
}

#[tokio::test]
async fn test_removing_last_size_prunes_the_product() {
    let store = CartStore::new(FakeCommerce::with_entries(vec![
        CartEntry {
            product: pid("p1"),
            size: "M".into(),
            quantity: 1,
        },
        CartEntry {
            product: pid("p1"),
            size: "L".into(),
            quantity: 2,
        },
    ]));

    let cart = store.remove(&pid("p1"), "M").await.unwrap();
    assert_eq!(cart.quantity(&pid("p1"), "L"), 2);

    let cart = store.remove(&pid("p1"), "L").await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_failed_mutation_returns_distinct_error_and_resyncs() {
    let fake = FakeCommerce::with_entries(vec![CartEntry {
        product: pid("p1"),
        size: "M".into(),
        quantity: 2,
    }]);
    fake.fail_mutations.store(true, Ordering::SeqCst);
    let store = CartStore::new(fake);
    store.refresh().await.unwrap();

    let add_err = store.add(&pid("p2"), "S", 1).await.unwrap_err();
    assert!(matches!(add_err, CartError::AddFailed(_)));

    let update_err = store.set_quantity(&pid("p1"), "M", 9).await.unwrap_err();
    assert!(matches!(update_err, CartError::UpdateFailed(_)));

    let remove_err = store.remove(&pid("p1"), "M").await.unwrap_err();
    assert!(matches!(remove_err, CartError::RemoveFailed(_)));

    let clear_err = store.clear().await.unwrap_err();
    assert!(matches!(clear_err, CartError::ClearFailed(_)));

    // The snapshot still matches the server: nothing was applied locally.
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.quantity(&pid("p1"), "M"), 2);
    assert_eq!(snapshot.lines().count(), 1);
}

#[tokio::test]
async fn test_mutation_applies_locally_when_refetch_fails() {
    let fake = Arc::new(FakeCommerce::new());
    // The write succeeds but the follow-up fetch does not; the local
    // snapshot still reflects the mutation.
    fake.fail_fetch.store(true, Ordering::SeqCst);
    let store = CartStore::new(Arc::clone(&fake));

    let cart = store.add(&pid("p1"), "M", 2).await.unwrap();

    assert_eq!(cart.quantity(&pid("p1"), "M"), 2);
    // The server accepted the write even though the fetch failed.
    assert_eq!(fake.entries().len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_surfaces_as_fetch_error() {
    let fake = FakeCommerce::new();
    fake.fail_fetch.store(true, Ordering::SeqCst);
    let store = CartStore::new(fake);

    let err = store.refresh().await.unwrap_err();
    assert!(matches!(err, CartError::FetchFailed(_)));
}

#[tokio::test]
async fn test_rapid_increments_are_serialised() {
    let store = Arc::new(CartStore::new(FakeCommerce::new()));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.add(&pid("p1"), "M", 1).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Ten increments of one, no lost updates.
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.quantity(&pid("p1"), "M"), 10);
}
