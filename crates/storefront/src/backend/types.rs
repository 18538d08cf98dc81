//! Wire types for the commerce backend's JSON endpoints.

use chatcart_core::CartItem;
use serde::{Deserialize, Serialize};

/// `GET /cart/{accessToken}/{tenantId}` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    /// Raw cart entries; duplicates sharing a SKU are possible.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// `POST /cart/add` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub access_token: String,
    pub tenant_id: String,
    /// Unit-specific SKU.
    pub sku: String,
    pub quantity: u32,
    pub selected_unit: String,
}

/// `PUT /cart/update` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub access_token: String,
    pub tenant_id: String,
    /// Unit-specific SKU.
    pub sku: String,
    pub selected_unit: String,
    pub new_quantity: u32,
}

/// `DELETE /cart/remove` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub access_token: String,
    pub tenant_id: String,
    /// Unit-specific SKU.
    pub sku: String,
    pub selected_unit: String,
}

/// Error body shape the backend uses for rejections.
///
/// Some deployments send `error`, others `message`; both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// The rejection message, whichever field carried it.
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
