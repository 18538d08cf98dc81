//! Catalog domain types.
//!
//! These types mirror the commerce backend's catalog payloads. Catalog
//! entities are read-only snapshots: each successful fetch replaces the
//! previous collection wholesale, nothing is patched in place.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// Opaque string key used both as a display label and as the `productType`
/// query filter on the products endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a category from a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

// =============================================================================
// Unit (product variant)
// =============================================================================

/// A purchasable size/volume variant of a product.
///
/// The unit SKU (not the product SKU) is the globally unique purchasable
/// identifier and the cart key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// Variant label (e.g., "250ml"), unique within the parent product.
    pub unit: String,
    /// Globally unique purchasable SKU.
    pub sku: String,
    /// Unit price. The backend sends this as either a JSON number or a
    /// decimal string; both are accepted.
    #[serde(deserialize_with = "lenient_decimal")]
    pub price: Decimal,
    /// Variant image; falls back to the product photo when absent.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Variant stock; falls back to product-level stock when absent.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// Display-only restock timestamp.
    #[serde(default)]
    pub last_restocked: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its ordered unit variants.
///
/// Unit order is significant: element 0 is the structural default variant
/// (see [`crate::types::selection`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product-level identifier; stable, not necessarily purchasable.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Category key this product belongs to.
    #[serde(rename = "type")]
    pub product_type: Category,
    /// Fallback image when no unit-specific image exists.
    #[serde(default)]
    pub photo_url: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered unit variants; non-empty for purchasable products.
    #[serde(default)]
    pub units: Vec<Unit>,
    /// Fallback stock when a unit lacks its own figure.
    #[serde(default)]
    pub product_stock: Option<i64>,
}

impl Product {
    /// Effective stock for a unit, with product-level fallback.
    ///
    /// An absent figure at both levels is treated as zero, uniformly: no
    /// stock information means not purchasable.
    #[must_use]
    pub fn effective_stock(&self, unit: &Unit) -> i64 {
        unit.stock_quantity.or(self.product_stock).unwrap_or(0)
    }

    /// Effective image URL for a unit, with product-photo fallback.
    #[must_use]
    pub fn effective_image<'a>(&'a self, unit: &'a Unit) -> &'a str {
        unit.image_url.as_deref().unwrap_or(&self.photo_url)
    }

    /// Whether the given unit can currently be added to a cart.
    #[must_use]
    pub fn is_purchasable(&self, unit: &Unit) -> bool {
        self.effective_stock(unit) > 0
    }

    /// Find a unit by its label.
    #[must_use]
    pub fn unit_by_label(&self, label: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.unit == label)
    }
}

/// Deserialize a [`Decimal`] from either a JSON string or a JSON number.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use rust_decimal::prelude::FromPrimitive;

    struct DecimalVisitor;

    impl serde::de::Visitor<'_> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal number or a decimal string")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Decimal, E> {
            v.parse::<Decimal>().map_err(E::custom)
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Decimal, E> {
            Decimal::from_f64(v).ok_or_else(|| E::custom(format!("invalid price: {v}")))
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(label: &str, sku: &str, stock: Option<i64>) -> Unit {
        Unit {
            unit: label.to_string(),
            sku: sku.to_string(),
            price: Decimal::new(10000, 2),
            image_url: None,
            stock_quantity: stock,
            last_restocked: None,
        }
    }

    fn product(units: Vec<Unit>, product_stock: Option<i64>) -> Product {
        Product {
            sku: "P1".to_string(),
            name: "Cold Brew".to_string(),
            product_type: Category::from("coffee"),
            photo_url: "https://cdn.example.com/p1.jpg".to_string(),
            description: None,
            units,
            product_stock,
        }
    }

    #[test]
    fn price_parses_from_string_and_number() {
        let from_string: Unit =
            serde_json::from_str(r#"{"unit":"250ml","sku":"P1-S","price":"100.50"}"#)
                .expect("string price");
        assert_eq!(from_string.price, Decimal::new(10050, 2));

        let from_number: Unit =
            serde_json::from_str(r#"{"unit":"250ml","sku":"P1-S","price":100.5}"#)
                .expect("numeric price");
        assert_eq!(from_number.price, Decimal::new(10050, 2));

        let from_integer: Unit = serde_json::from_str(r#"{"unit":"250ml","sku":"P1-S","price":180}"#)
            .expect("integer price");
        assert_eq!(from_integer.price, Decimal::from(180));
    }

    #[test]
    fn unit_stock_wins_over_product_stock() {
        let p = product(vec![unit("250ml", "P1-S", Some(3))], Some(10));
        assert_eq!(p.effective_stock(&p.units[0]), 3);
    }

    #[test]
    fn missing_unit_stock_falls_back_to_product_stock() {
        let p = product(vec![unit("250ml", "P1-S", None)], Some(7));
        assert_eq!(p.effective_stock(&p.units[0]), 7);
    }

    #[test]
    fn missing_stock_everywhere_defaults_to_zero() {
        let p = product(vec![unit("250ml", "P1-S", None)], None);
        assert_eq!(p.effective_stock(&p.units[0]), 0);
        assert!(!p.is_purchasable(&p.units[0]));
    }

    #[test]
    fn image_falls_back_to_product_photo() {
        let mut with_image = unit("250ml", "P1-S", Some(1));
        with_image.image_url = Some("https://cdn.example.com/p1-s.jpg".to_string());
        let p = product(vec![with_image, unit("500ml", "P1-L", Some(1))], None);

        assert_eq!(
            p.effective_image(&p.units[0]),
            "https://cdn.example.com/p1-s.jpg"
        );
        assert_eq!(p.effective_image(&p.units[1]), "https://cdn.example.com/p1.jpg");
    }

    #[test]
    fn product_deserializes_backend_shape() {
        let json = r#"{
            "sku": "P1",
            "name": "Cold Brew",
            "type": "coffee",
            "photoUrl": "https://cdn.example.com/p1.jpg",
            "productStock": 5,
            "units": [
                {"unit": "250ml", "sku": "P1-S", "price": "100", "stockQuantity": 3},
                {"unit": "500ml", "sku": "P1-L", "price": 180, "stockQuantity": 0}
            ]
        }"#;

        let p: Product = serde_json::from_str(json).expect("product parses");
        assert_eq!(p.product_type, Category::from("coffee"));
        assert_eq!(p.units.len(), 2);
        assert_eq!(p.units[1].sku, "P1-L");
        assert!(!p.is_purchasable(&p.units[1]));
    }
}
