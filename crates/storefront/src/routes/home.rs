//! Home route handler.

use axum::extract::RawQuery;
use axum::response::Redirect;

/// The storefront has a single entry point: the catalog. Deep-link query
/// parameters are forwarded so the tenant context survives the redirect.
pub async fn home(RawQuery(query): RawQuery) -> Redirect {
    match query {
        Some(query) => Redirect::to(&format!("/catalog?{query}")),
        None => Redirect::to("/catalog"),
    }
}
