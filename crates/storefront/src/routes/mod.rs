//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to catalog
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /catalog                 - Category tabs + product grid
//! POST /catalog/select-unit     - Record unit selection, re-render card (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add resolved unit (returns product card)
//! POST /cart/update             - Set quantity (0 removes; returns product card)
//! POST /cart/remove             - Remove line (returns product card)
//! GET  /cart/count              - Cart count badge (fragment)
//! ```

pub mod cart;
pub mod catalog;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/select-unit", post(catalog::select_unit))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
}
