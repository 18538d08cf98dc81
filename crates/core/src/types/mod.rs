//! Core types for Chatcart.
//!
//! This module provides the catalog and cart domain model.

pub mod cart;
pub mod catalog;
pub mod selection;

pub use cart::{CartItem, CartLine, CartState};
pub use catalog::{Category, Product, Unit};
pub use selection::UnitSelections;
