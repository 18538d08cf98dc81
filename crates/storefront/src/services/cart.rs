//! Cart reconciliation service.
//!
//! Owns the client-side view of the cart. Every mutating call goes to the
//! backend first and then re-fetches the authoritative cart to rebuild the
//! local snapshot - the mutation response is never trusted to patch local
//! state, so server-side quantity clamping and stock races are absorbed
//! automatically. There are no optimistic writes and therefore no rollback:
//! a rejected mutation leaves the pre-mutation snapshot untouched.
//!
//! Concurrent mutations on different lines are dispatched independently;
//! whichever re-fetch lands last wins.

use thiserror::Error;
use tracing::instrument;

use chatcart_core::{CartState, Product, Unit, UnitSelections};

use crate::backend::{BackendClient, BackendError};
use crate::services::context::TenantContext;

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The resolved unit is not purchasable, or the backend rejected the
    /// requested quantity. Surfaced as a transient notification; cart state
    /// is unchanged.
    #[error("out of stock")]
    OutOfStock,

    /// The backend call failed for a non-stock reason. No retry is
    /// performed; the user re-triggers the action.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Cart operations scoped to one tenant context.
pub struct CartService<'a> {
    backend: &'a BackendClient,
    ctx: &'a TenantContext,
}

impl<'a> CartService<'a> {
    /// Create a cart service for a resolved tenant context.
    #[must_use]
    pub const fn new(backend: &'a BackendClient, ctx: &'a TenantContext) -> Self {
        Self { backend, ctx }
    }

    /// Fetch the authoritative cart and build a coalesced snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn fetch_cart(&self) -> Result<CartState, CartError> {
        let items = self.backend.fetch_cart(self.ctx).await?;
        Ok(CartState::coalesce(items))
    }

    /// Add the product's resolved unit to the cart.
    ///
    /// Pre-checks effective stock: a unit with no available stock fails
    /// immediately with [`CartError::OutOfStock`] and issues no network
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] on a client- or server-side stock
    /// rejection, [`CartError::Backend`] on any other failure.
    #[instrument(skip_all, fields(product = %product.sku, quantity))]
    pub async fn add_to_cart(
        &self,
        product: &Product,
        selections: &UnitSelections,
        quantity: u32,
    ) -> Result<CartState, CartError> {
        let unit = resolve_purchasable(product, selections)?;

        self.backend
            .add_to_cart(self.ctx, &unit.sku, &unit.unit, quantity)
            .await
            .map_err(stock_aware)?;

        self.fetch_cart().await
    }

    /// Set the quantity of the product's resolved unit.
    ///
    /// A quantity of zero is a removal, not a zero-quantity line. The unit
    /// label sent to the backend is the one recorded on the existing cart
    /// line, falling back to the resolved unit when no line exists yet
    /// (the "increment before first add" affordance).
    ///
    /// # Errors
    ///
    /// Same semantics as [`Self::add_to_cart`].
    #[instrument(skip_all, fields(product = %product.sku, new_quantity))]
    pub async fn set_quantity(
        &self,
        product: &Product,
        selections: &UnitSelections,
        new_quantity: u32,
    ) -> Result<CartState, CartError> {
        if new_quantity == 0 {
            return self.remove_line(product, selections).await;
        }

        let unit = selections.resolve(product).ok_or(CartError::OutOfStock)?;
        let current = self.fetch_cart().await?;

        // Refuse to grow a line whose unit has no stock left.
        if new_quantity > current.quantity_of(&unit.sku) && !product.is_purchasable(unit) {
            return Err(CartError::OutOfStock);
        }

        let label = current
            .line(&unit.sku)
            .and_then(|line| line.selected_unit.clone())
            .unwrap_or_else(|| unit.unit.clone());

        self.backend
            .update_cart(self.ctx, &unit.sku, &label, new_quantity)
            .await
            .map_err(stock_aware)?;

        self.fetch_cart().await
    }

    /// Remove the product's resolved unit from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Backend`] if the backend call fails.
    #[instrument(skip_all, fields(product = %product.sku))]
    pub async fn remove_line(
        &self,
        product: &Product,
        selections: &UnitSelections,
    ) -> Result<CartState, CartError> {
        let Some(unit) = selections.resolve(product) else {
            // Nothing purchasable, nothing to remove; return the live cart.
            return self.fetch_cart().await;
        };

        let current = self.fetch_cart().await?;
        let label = current
            .line(&unit.sku)
            .and_then(|line| line.selected_unit.clone())
            .unwrap_or_else(|| unit.unit.clone());

        self.backend
            .remove_from_cart(self.ctx, &unit.sku, &label)
            .await?;

        self.fetch_cart().await
    }
}

/// Collapse backend stock rejections into [`CartError::OutOfStock`].
fn stock_aware(err: BackendError) -> CartError {
    if err.is_stock() {
        CartError::OutOfStock
    } else {
        CartError::Backend(err)
    }
}

/// Resolve the active unit and check it is purchasable.
fn resolve_purchasable<'p>(
    product: &'p Product,
    selections: &UnitSelections,
) -> Result<&'p Unit, CartError> {
    let unit = selections.resolve(product).ok_or(CartError::OutOfStock)?;
    if product.is_purchasable(unit) {
        Ok(unit)
    } else {
        Err(CartError::OutOfStock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_error_display() {
        assert_eq!(CartError::OutOfStock.to_string(), "out of stock");

        let err = CartError::Backend(BackendError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        });
        assert_eq!(err.to_string(), "Backend error (502): bad gateway");
    }
}
