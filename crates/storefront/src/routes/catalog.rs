//! Catalog route handlers.
//!
//! The catalog page lists the tenant's categories and the products of the
//! selected category. Unit selection and all cart mutations happen on the
//! product cards via HTMX fragment swaps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use chatcart_core::{CartState, Category, Product, UnitSelections};

use crate::middleware::RequireTenant;
use crate::models::session::{load_selections, save_selections};
use crate::services::CartService;
use crate::state::AppState;

/// Format a decimal amount as a price string.
pub fn format_price(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Category tab display data for templates.
#[derive(Clone)]
pub struct CategoryTabView {
    pub key: String,
    pub selected: bool,
}

/// Unit dropdown option display data for templates.
#[derive(Clone)]
pub struct UnitOptionView {
    pub label: String,
    pub selected: bool,
}

/// Product card display data for templates.
///
/// Everything the card shows is derived from the resolved unit with
/// product-level fallback, precomputed here so the template stays dumb.
#[derive(Clone)]
pub struct ProductCardView {
    pub product_sku: String,
    pub category: String,
    pub name: String,
    pub image_url: String,
    pub price: String,
    pub purchasable: bool,
    pub has_units: bool,
    pub unit_options: Vec<UnitOptionView>,
    pub in_cart: bool,
    pub quantity_in_cart: u32,
    pub inc_quantity: u32,
    pub dec_quantity: u32,
    pub restocked: Option<String>,
    pub notice: Option<String>,
}

impl ProductCardView {
    /// Build a card for a product given the visitor's selections and the
    /// current cart snapshot.
    #[must_use]
    pub fn build(
        product: &Product,
        selections: &UnitSelections,
        cart: &CartState,
        notice: Option<String>,
    ) -> Self {
        let resolved = selections.resolve(product);

        let (price, image_url, purchasable, quantity_in_cart, restocked) = match resolved {
            Some(unit) => (
                format_price(unit.price),
                product.effective_image(unit).to_string(),
                product.is_purchasable(unit),
                cart.quantity_of(&unit.sku),
                unit.last_restocked
                    .map(|t| t.format("%Y-%m-%d").to_string()),
            ),
            None => (String::new(), product.photo_url.clone(), false, 0, None),
        };

        let unit_options = product
            .units
            .iter()
            .map(|u| UnitOptionView {
                label: u.unit.clone(),
                selected: resolved.is_some_and(|r| r.sku == u.sku),
            })
            .collect();

        Self {
            product_sku: product.sku.clone(),
            category: product.product_type.to_string(),
            name: product.name.clone(),
            image_url,
            price,
            purchasable,
            has_units: product.units.len() > 1,
            unit_options,
            in_cart: quantity_in_cart > 0,
            quantity_in_cart,
            inc_quantity: quantity_in_cart.saturating_add(1),
            dec_quantity: quantity_in_cart.saturating_sub(1),
            restocked,
            notice,
        }
    }
}

/// Catalog page query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// Unit selection form data.
#[derive(Debug, Deserialize)]
pub struct SelectUnitForm {
    pub product_sku: String,
    pub category: String,
    pub unit: String,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub tabs: Vec<CategoryTabView>,
    pub cards: Vec<ProductCardView>,
    pub cart_count: usize,
    pub show_cart: bool,
    pub error: Option<String>,
}

/// Product card fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_card.html")]
pub struct ProductCardTemplate {
    pub card: ProductCardView,
}

/// Transient notification fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub level: String,
    pub message: String,
}

/// Render an error notice fragment.
pub fn notice(message: &str) -> Response {
    NoticeTemplate {
        level: "error".to_string(),
        message: message.to_string(),
    }
    .into_response()
}

/// Display the catalog page.
///
/// Categories follow the default-first rule: with no explicit `?category=`
/// the first category of the fetched list is selected. Fetch failures
/// degrade to an empty list plus an error banner with a retry link.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    RequireTenant(ctx): RequireTenant,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let selections = load_selections(&session).await;
    let mut error = None;

    let categories = match state.backend().fetch_categories(&ctx.tenant_id).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            error = Some("Could not load categories.".to_string());
            Vec::new()
        }
    };

    let selected = query
        .category
        .map(Category::new)
        .or_else(|| categories.first().cloned());

    let products = match &selected {
        Some(category) => match state.backend().fetch_products(&ctx.tenant_id, category).await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!("Failed to fetch products for {category}: {e}");
                error = Some("Could not load products.".to_string());
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    // The cart is only needed for badges and per-card quantities; a failed
    // fetch degrades to an empty cart but still surfaces in the banner.
    let cart = match CartService::new(state.backend(), &ctx).fetch_cart().await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            error.get_or_insert_with(|| "Could not load your cart.".to_string());
            CartState::default()
        }
    };

    let tabs = categories
        .iter()
        .map(|category| CategoryTabView {
            key: category.to_string(),
            selected: Some(category) == selected.as_ref(),
        })
        .collect();

    let cards = products
        .iter()
        .map(|product| ProductCardView::build(product, &selections, &cart, None))
        .collect();

    CatalogIndexTemplate {
        tabs,
        cards,
        cart_count: cart.line_count(),
        show_cart: cart.show_cart(),
        error,
    }
}

/// Record a unit selection and re-render the product card (HTMX).
#[instrument(skip(state, session, form))]
pub async fn select_unit(
    State(state): State<AppState>,
    RequireTenant(ctx): RequireTenant,
    session: Session,
    axum::Form(form): axum::Form<SelectUnitForm>,
) -> Response {
    let category = Category::new(form.category);
    let products = match state.backend().fetch_products(&ctx.tenant_id, &category).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products for unit selection: {e}");
            return notice("Could not load the product. Please try again.");
        }
    };

    let Some(product) = products.iter().find(|p| p.sku == form.product_sku) else {
        return notice("Product not found.");
    };

    let mut selections = load_selections(&session).await;
    selections.record(product, &form.unit);
    save_selections(&session, &selections).await;

    let cart = match CartService::new(state.backend(), &ctx).fetch_cart().await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartState::default()
        }
    };

    ProductCardTemplate {
        card: ProductCardView::build(product, &selections, &cart, None),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_page_renders_error_banner() {
        let html = CatalogIndexTemplate {
            tabs: Vec::new(),
            cards: Vec::new(),
            cart_count: 0,
            show_cart: false,
            error: Some("Could not load your cart.".to_string()),
        }
        .render()
        .expect("renders");

        assert!(html.contains("Could not load your cart."));
        assert!(html.contains("Retry"));
    }

    #[test]
    fn format_price_renders_two_decimal_places() {
        assert_eq!(format_price(Decimal::new(10050, 2)), "$100.50");
        assert_eq!(format_price(Decimal::from(180)), "$180.00");
    }
}
