//! Pure cart state model and reducers.
//!
//! The cart is a nested map keyed by product id, then by size. Quantities
//! are strictly positive: setting a line to zero removes it, and removing
//! the last size of a product prunes the product entry entirely, so an
//! empty cart is always represented by an empty map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use marigold_core::ProductId;

use crate::commerce::types::CartEntry;

/// Local snapshot of the remote cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: BTreeMap<ProductId, BTreeMap<String, u32>>,
}

impl CartState {
    /// Build a snapshot from the API's flat entry list.
    ///
    /// Zero-quantity entries are dropped rather than stored; duplicate
    /// (product, size) entries accumulate.
    #[must_use]
    pub fn from_entries(entries: &[CartEntry]) -> Self {
        let mut state = Self::default();
        for entry in entries {
            state.add_line(&entry.product, &entry.size, entry.quantity);
        }
        state
    }

    /// Increment a line's quantity. Adding zero is a no-op.
    pub fn add_line(&mut self, product_id: &ProductId, size: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let line = self
            .items
            .entry(product_id.clone())
            .or_default()
            .entry(size.to_owned())
            .or_insert(0);
        *line = line.saturating_add(quantity);
    }

    /// Set a line's quantity exactly. Zero removes the line and prunes the
    /// product entry if it was the last size.
    pub fn set_quantity(&mut self, product_id: &ProductId, size: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_line(product_id, size);
            return;
        }
        self.items
            .entry(product_id.clone())
            .or_default()
            .insert(size.to_owned(), quantity);
    }

    /// Remove a line, pruning the product entry if it becomes empty.
    pub fn remove_line(&mut self, product_id: &ProductId, size: &str) {
        if let Some(sizes) = self.items.get_mut(product_id) {
            sizes.remove(size);
            if sizes.is_empty() {
                self.items.remove(product_id);
            }
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a specific line, zero when absent.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId, size: &str) -> u32 {
        self.items
            .get(product_id)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate all lines as `(product, size, quantity)`.
    pub fn lines(&self) -> impl Iterator<Item = (&ProductId, &str, u32)> {
        self.items.iter().flat_map(|(product, sizes)| {
            sizes
                .iter()
                .map(move |(size, &quantity)| (product, size.as_str(), quantity))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::from(s)
    }

    #[test]
    fn test_from_entries_drops_zero_quantities() {
        let entries = vec![
            CartEntry {
                product: pid("p1"),
                size: "M".into(),
                quantity: 2,
            },
            CartEntry {
                product: pid("p2"),
                size: "L".into(),
                quantity: 0,
            },
        ];
        let state = CartState::from_entries(&entries);
        assert_eq!(state.quantity(&pid("p1"), "M"), 2);
        assert_eq!(state.quantity(&pid("p2"), "L"), 0);
        assert_eq!(state.lines().count(), 1);
    }

    #[test]
    fn test_from_entries_accumulates_duplicates() {
        let entries = vec![
            CartEntry {
                product: pid("p1"),
                size: "M".into(),
                quantity: 1,
            },
            CartEntry {
                product: pid("p1"),
                size: "M".into(),
                quantity: 2,
            },
        ];
        let state = CartState::from_entries(&entries);
        assert_eq!(state.quantity(&pid("p1"), "M"), 3);
    }

    #[test]
    fn test_add_line_zero_is_noop() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_add_line_increments() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 1);
        state.add_line(&pid("p1"), "M", 2);
        assert_eq!(state.quantity(&pid("p1"), "M"), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes_and_prunes() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 2);
        state.set_quantity(&pid("p1"), "M", 0);
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_quantity_is_idempotent() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 1);
        state.set_quantity(&pid("p1"), "M", 5);
        state.set_quantity(&pid("p1"), "M", 5);
        assert_eq!(state.quantity(&pid("p1"), "M"), 5);
    }

    #[test]
    fn test_remove_last_size_prunes_product() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 1);
        state.add_line(&pid("p1"), "L", 1);
        state.remove_line(&pid("p1"), "M");
        assert_eq!(state.quantity(&pid("p1"), "L"), 1);
        state.remove_line(&pid("p1"), "L");
        assert!(state.is_empty());
    }

    #[test]
    fn test_remove_absent_line_is_noop() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 1);
        state.remove_line(&pid("p2"), "M");
        state.remove_line(&pid("p1"), "S");
        assert_eq!(state.quantity(&pid("p1"), "M"), 1);
    }

    #[test]
    fn test_lines_iterates_all() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 2);
        state.add_line(&pid("p1"), "L", 1);
        state.add_line(&pid("p2"), "S", 4);
        let lines: Vec<_> = state
            .lines()
            .map(|(p, s, q)| (p.as_str().to_owned(), s.to_owned(), q))
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&("p1".into(), "L".into(), 1)));
        assert!(lines.contains(&("p2".into(), "S".into(), 4)));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = CartState::default();
        state.add_line(&pid("p1"), "M", 2);
        let json = serde_json::to_string(&state).unwrap();
        let back: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
