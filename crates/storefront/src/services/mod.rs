//! Storefront services.

pub mod cart;
pub mod context;

pub use cart::{CartError, CartService};
pub use context::{AuthError, ResolvedContext, TenantContext, resolve_context};
