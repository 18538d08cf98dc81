//! Cart route handlers.
//!
//! Cart mutations use HTMX for dynamic updates without full page reloads.
//! Mutations are keyed by product (the active unit is resolved from the
//! visitor's selections) and respond with the refreshed product card plus
//! an `HX-Trigger: cart-updated` header so the cart badge re-fetches
//! itself. Stock rejections render as inline notices on the unchanged
//! card; they are notifications, not failures.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use chatcart_core::{CartState, Category, Product, UnitSelections};

use crate::middleware::RequireTenant;
use crate::models::session::load_selections;
use crate::services::context::TenantContext;
use crate::services::{CartError, CartService};
use crate::state::AppState;

use super::catalog::{ProductCardTemplate, ProductCardView, format_price, notice};

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub name: String,
    pub unit: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: usize,
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart
                .lines()
                .map(|line| CartItemView {
                    name: line.product_name.clone(),
                    unit: line.selected_unit.clone().unwrap_or_default(),
                    quantity: line.quantity,
                    price: format_price(line.price),
                    line_total: format_price(
                        line.price * rust_decimal::Decimal::from(line.quantity),
                    ),
                })
                .collect(),
            subtotal: format_price(cart.subtotal()),
            item_count: cart.line_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_sku: String,
    pub category: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_sku: String,
    pub category: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_sku: String,
    pub category: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
    pub show_cart: bool,
    pub unavailable: bool,
}

/// Display the cart page.
///
/// A failed fetch renders the page with an error notice and a retry link
/// instead of silently presenting an empty cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, RequireTenant(ctx): RequireTenant) -> Response {
    let (cart, error) = match CartService::new(state.backend(), &ctx).fetch_cart().await {
        Ok(cart) => (cart, None),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            (
                CartState::default(),
                Some("Could not load your cart.".to_string()),
            )
        }
    };

    CartShowTemplate {
        cart: CartView::from(&cart),
        error,
    }
    .into_response()
}

/// Get the cart count badge (HTMX).
///
/// When the count cannot be fetched, the badge still links through to the
/// cart page (which shows the full error) instead of pretending the cart
/// is empty.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>, RequireTenant(ctx): RequireTenant) -> Response {
    let (cart, unavailable) = match CartService::new(state.backend(), &ctx).fetch_cart().await {
        Ok(cart) => (cart, false),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            (CartState::default(), true)
        }
    };

    CartCountTemplate {
        count: cart.line_count(),
        show_cart: cart.show_cart(),
        unavailable,
    }
    .into_response()
}

/// Add the product's resolved unit to the cart (HTMX).
#[instrument(skip(state, session, form))]
pub async fn add(
    State(state): State<AppState>,
    RequireTenant(ctx): RequireTenant,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let Some((product, selections)) =
        lookup_product(&state, &ctx, &session, &form.category, &form.product_sku).await
    else {
        return notice("Product not found.");
    };

    let quantity = form.quantity.unwrap_or(1).max(1);
    let service = CartService::new(state.backend(), &ctx);

    match service.add_to_cart(&product, &selections, quantity).await {
        Ok(cart) => card_response(&product, &selections, &cart, None),
        Err(e) => rejection_response(&service, &product, &selections, &e).await,
    }
}

/// Set the quantity of the product's resolved unit (HTMX).
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireTenant(ctx): RequireTenant,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some((product, selections)) =
        lookup_product(&state, &ctx, &session, &form.category, &form.product_sku).await
    else {
        return notice("Product not found.");
    };

    let service = CartService::new(state.backend(), &ctx);

    match service
        .set_quantity(&product, &selections, form.quantity)
        .await
    {
        Ok(cart) => card_response(&product, &selections, &cart, None),
        Err(e) => rejection_response(&service, &product, &selections, &e).await,
    }
}

/// Remove the product's resolved unit from the cart (HTMX).
#[instrument(skip(state, session, form))]
pub async fn remove(
    State(state): State<AppState>,
    RequireTenant(ctx): RequireTenant,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some((product, selections)) =
        lookup_product(&state, &ctx, &session, &form.category, &form.product_sku).await
    else {
        return notice("Product not found.");
    };

    let service = CartService::new(state.backend(), &ctx);

    match service.remove_line(&product, &selections).await {
        Ok(cart) => card_response(&product, &selections, &cart, None),
        Err(e) => rejection_response(&service, &product, &selections, &e).await,
    }
}

/// Find the form's product in the (cached) product list and load the
/// visitor's selections.
async fn lookup_product(
    state: &AppState,
    ctx: &TenantContext,
    session: &Session,
    category: &str,
    product_sku: &str,
) -> Option<(Product, UnitSelections)> {
    let category = Category::new(category);
    let products = match state.backend().fetch_products(&ctx.tenant_id, &category).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products for cart mutation: {e}");
            return None;
        }
    };

    let product = products.into_iter().find(|p| p.sku == product_sku)?;
    let selections = load_selections(session).await;
    Some((product, selections))
}

/// Refreshed product card with the cart-updated trigger.
fn card_response(
    product: &Product,
    selections: &UnitSelections,
    cart: &CartState,
    message: Option<String>,
) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        ProductCardTemplate {
            card: ProductCardView::build(product, selections, cart, message),
        },
    )
        .into_response()
}

/// Render a rejected mutation: the card stays on its pre-mutation state
/// (re-fetched from the backend, which never saw a change) with an inline
/// notice.
async fn rejection_response(
    service: &CartService<'_>,
    product: &Product,
    selections: &UnitSelections,
    error: &CartError,
) -> Response {
    let message = match error {
        CartError::OutOfStock => "Out of stock.".to_string(),
        CartError::Backend(e) => {
            tracing::error!("Cart mutation failed: {e}");
            "Something went wrong. Please try again.".to_string()
        }
    };

    let cart = match service.fetch_cart().await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart after rejection: {e}");
            CartState::default()
        }
    };

    ProductCardTemplate {
        card: ProductCardView::build(product, selections, &cart, Some(message)),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_page_shows_error_notice_when_fetch_failed() {
        let html = CartShowTemplate {
            cart: CartView::from(&CartState::default()),
            error: Some("Could not load your cart.".to_string()),
        }
        .render()
        .expect("renders");

        assert!(html.contains("Could not load your cart."));
        assert!(html.contains("Retry"));
        assert!(!html.contains("Your cart is empty."));
    }

    #[test]
    fn cart_page_without_error_lists_items() {
        let html = CartShowTemplate {
            cart: CartView::from(&CartState::default()),
            error: None,
        }
        .render()
        .expect("renders");

        assert!(html.contains("Your cart is empty."));
    }

    #[test]
    fn unavailable_badge_still_links_to_cart_page() {
        let html = CartCountTemplate {
            count: 0,
            show_cart: false,
            unavailable: true,
        }
        .render()
        .expect("renders");

        assert!(html.contains(r#"href="/cart""#));
        assert!(!html.contains('('));
    }

    #[test]
    fn empty_cart_badge_renders_nothing() {
        let html = CartCountTemplate {
            count: 0,
            show_cart: false,
            unavailable: false,
        }
        .render()
        .expect("renders");

        assert!(html.trim().is_empty());
    }
}
