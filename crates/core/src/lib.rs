//! Chatcart Core - Shared catalog and cart domain types.
//!
//! This crate holds the domain model shared by the storefront binary and its
//! tests:
//!
//! - [`types::catalog`] - Categories, products, and per-product unit variants
//! - [`types::cart`] - Cart lines and the coalesced cart snapshot
//! - [`types::selection`] - Deterministic unit-variant selection
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. Everything that talks to the commerce backend lives
//! in the `storefront` crate and deserializes into these types.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
