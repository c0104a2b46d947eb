//! Cache value wrapper for the commerce client's moka cache.

use super::types::Product;

/// Values stored in the catalog cache.
#[derive(Clone)]
pub enum CacheValue {
    /// Full catalog (`GET /products/all`).
    Catalog(Vec<Product>),
    /// Bestseller list (`GET /products/bestseller`).
    Bestsellers(Vec<Product>),
    /// Single product (`POST /products/getsingle`).
    Product(Box<Product>),
}
