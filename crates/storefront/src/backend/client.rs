//! Commerce backend HTTP client implementation.
//!
//! Caches categories and product lists using `moka` (5-minute TTL). Cart
//! endpoints are never cached: the cart is mutable state owned by the
//! backend and every read must be authoritative.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use chatcart_core::{CartItem, Category, Product};

use super::BackendError;
use super::cache::CacheValue;
use super::types::{
    AddToCartRequest, CartPayload, ErrorBody, RemoveFromCartRequest, UpdateCartRequest,
};
use crate::services::context::TenantContext;

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Client for the commerce backend API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and the
/// catalog cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client for the given base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Read a JSON response body, converting non-success statuses into the
    /// backend error taxonomy.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Check a mutation response for success.
    ///
    /// The mutation body itself is discarded: callers re-fetch the
    /// authoritative cart instead of trusting it. Some backend versions
    /// report stock rejections inside a 200 body, so the body is still
    /// inspected for an error message.
    async fn check_mutation(response: reqwest::Response) -> Result<(), BackendError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &text));
        }

        // A 200 body carrying a benign message ("added to cart") is fine;
        // only stock rejections smuggled into a success status are errors.
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text)
            && let Some(message) = body.into_message()
            && message.to_lowercase().contains("stock")
        {
            return Err(BackendError::Stock(message));
        }

        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the ordered category list for a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self, tenant_id: &str) -> Result<Vec<Category>, BackendError> {
        let cache_key = format!("categories:{tenant_id}");

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("categories"))
            .query(&[("tenantId", tenant_id)])
            .send()
            .await?;

        let categories: Vec<Category> = Self::read_json(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the product list for a tenant and category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn fetch_products(
        &self,
        tenant_id: &str,
        category: &Category,
    ) -> Result<Vec<Product>, BackendError> {
        let cache_key = format!("products:{tenant_id}:{category}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("products"))
            .query(&[("tenantId", tenant_id), ("productType", category.as_str())])
            .send()
            .await?;

        let products: Vec<Product> = Self::read_json(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the authoritative cart for a tenant/token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(tenant = %ctx.tenant_id))]
    pub async fn fetch_cart(&self, ctx: &TenantContext) -> Result<Vec<CartItem>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&format!(
                "cart/{}/{}",
                ctx.access_token, ctx.tenant_id
            )))
            .send()
            .await?;

        let payload: CartPayload = Self::read_json(response).await?;
        Ok(payload.items)
    }

    /// Add a unit to the cart.
    ///
    /// The backend is the sole arbiter of whether the requested quantity
    /// exceeds remaining stock.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Stock`] on an insufficient-stock rejection,
    /// or another variant on transport/API failure.
    #[instrument(skip_all, fields(tenant = %ctx.tenant_id, sku = %sku, quantity))]
    pub async fn add_to_cart(
        &self,
        ctx: &TenantContext,
        sku: &str,
        selected_unit: &str,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let body = AddToCartRequest {
            access_token: ctx.access_token.clone(),
            tenant_id: ctx.tenant_id.clone(),
            sku: sku.to_string(),
            quantity,
            selected_unit: selected_unit.to_string(),
        };

        let response = self
            .inner
            .client
            .post(self.endpoint("cart/add"))
            .json(&body)
            .send()
            .await?;

        Self::check_mutation(response).await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Stock`] on an insufficient-stock rejection,
    /// or another variant on transport/API failure.
    #[instrument(skip_all, fields(tenant = %ctx.tenant_id, sku = %sku, new_quantity))]
    pub async fn update_cart(
        &self,
        ctx: &TenantContext,
        sku: &str,
        selected_unit: &str,
        new_quantity: u32,
    ) -> Result<(), BackendError> {
        let body = UpdateCartRequest {
            access_token: ctx.access_token.clone(),
            tenant_id: ctx.tenant_id.clone(),
            sku: sku.to_string(),
            selected_unit: selected_unit.to_string(),
            new_quantity,
        };

        let response = self
            .inner
            .client
            .put(self.endpoint("cart/update"))
            .json(&body)
            .send()
            .await?;

        Self::check_mutation(response).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error on transport/API failure.
    #[instrument(skip_all, fields(tenant = %ctx.tenant_id, sku = %sku))]
    pub async fn remove_from_cart(
        &self,
        ctx: &TenantContext,
        sku: &str,
        selected_unit: &str,
    ) -> Result<(), BackendError> {
        let body = RemoveFromCartRequest {
            access_token: ctx.access_token.clone(),
            tenant_id: ctx.tenant_id.clone(),
            sku: sku.to_string(),
            selected_unit: selected_unit.to_string(),
        };

        let response = self
            .inner
            .client
            .delete(self.endpoint("cart/remove"))
            .json(&body)
            .send()
            .await?;

        Self::check_mutation(response).await
    }
}

/// Convert a non-success response into the backend error taxonomy.
fn error_from_response(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.is_empty() {
                status.to_string()
            } else {
                snippet
            }
        });

    if status == StatusCode::NOT_FOUND {
        return BackendError::NotFound(message);
    }

    classify_rejection(status, message)
}

/// Classify a rejection message as a stock error or a generic API error.
fn classify_rejection(status: StatusCode, message: String) -> BackendError {
    if status == StatusCode::CONFLICT || message.to_lowercase().contains("stock") {
        BackendError::Stock(message)
    } else {
        BackendError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
