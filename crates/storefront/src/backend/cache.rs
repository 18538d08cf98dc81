//! Cache types for catalog responses.

use chatcart_core::{Category, Product};

/// Cached value types.
///
/// Only read-only catalog collections are cached; cart payloads are mutable
/// state and always fetched fresh.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
}
