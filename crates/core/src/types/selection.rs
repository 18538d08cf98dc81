//! Unit-variant selection.
//!
//! Given a product with several unit variants, exactly one is "active" for
//! display, pricing, and add-to-cart targeting. Selection follows the
//! default-first rule: absent an explicit user choice, `units[0]` wins.
//!
//! The API is deliberately two-step: [`UnitSelections::default_unit`] is a
//! pure read and [`UnitSelections::record`] is an explicit mutation. Reads
//! never mutate, so resolution cannot alternate between units across calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::catalog::{Product, Unit};

/// Explicit unit selections, keyed by product SKU.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitSelections {
    by_product: HashMap<String, String>,
}

impl UnitSelections {
    /// Create an empty selection set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The structural default unit of a product: the first element of its
    /// ordered unit sequence. Pure; does not record anything.
    #[must_use]
    pub fn default_unit(product: &Product) -> Option<&Unit> {
        product.units.first()
    }

    /// Record an explicit selection for a product.
    ///
    /// Labels that do not name one of the product's units are ignored, so a
    /// stale selection (e.g., after a catalog refresh changed the variants)
    /// silently falls back to the default.
    pub fn record(&mut self, product: &Product, unit_label: &str) {
        if product.unit_by_label(unit_label).is_some() {
            self.by_product
                .insert(product.sku.clone(), unit_label.to_owned());
        }
    }

    /// The recorded selection for a product, if any and still valid.
    #[must_use]
    pub fn recorded<'a>(&self, product: &'a Product) -> Option<&'a Unit> {
        self.by_product
            .get(&product.sku)
            .and_then(|label| product.unit_by_label(label))
    }

    /// Resolve the active unit for a product.
    ///
    /// Returns the recorded explicit selection when present, otherwise the
    /// default-first unit. `None` only for products with no units at all.
    #[must_use]
    pub fn resolve<'a>(&self, product: &'a Product) -> Option<&'a Unit> {
        self.recorded(product).or_else(|| Self::default_unit(product))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::catalog::Category;

    fn product_with_units(labels: &[&str]) -> Product {
        Product {
            sku: "P1".to_string(),
            name: "Cold Brew".to_string(),
            product_type: Category::from("coffee"),
            photo_url: String::new(),
            description: None,
            units: labels
                .iter()
                .enumerate()
                .map(|(i, label)| Unit {
                    unit: (*label).to_string(),
                    sku: format!("P1-{i}"),
                    price: Decimal::from(100),
                    image_url: None,
                    stock_quantity: Some(3),
                    last_restocked: None,
                })
                .collect(),
            product_stock: None,
        }
    }

    #[test]
    fn no_explicit_selection_resolves_to_first_unit() {
        let product = product_with_units(&["250ml", "500ml"]);
        let selections = UnitSelections::new();

        let resolved = selections.resolve(&product).expect("has units");
        assert_eq!(resolved.unit, "250ml");
    }

    #[test]
    fn resolution_is_stable_across_repeated_calls() {
        let product = product_with_units(&["250ml", "500ml"]);
        let selections = UnitSelections::new();

        let first = selections.resolve(&product).expect("has units").unit.clone();
        let second = selections.resolve(&product).expect("has units").unit.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_selection_overrides_default() {
        let product = product_with_units(&["250ml", "500ml"]);
        let mut selections = UnitSelections::new();
        selections.record(&product, "500ml");

        let resolved = selections.resolve(&product).expect("has units");
        assert_eq!(resolved.unit, "500ml");
    }

    #[test]
    fn unknown_label_is_ignored() {
        let product = product_with_units(&["250ml", "500ml"]);
        let mut selections = UnitSelections::new();
        selections.record(&product, "1000ml");

        let resolved = selections.resolve(&product).expect("has units");
        assert_eq!(resolved.unit, "250ml");
    }

    #[test]
    fn product_without_units_resolves_to_none() {
        let product = product_with_units(&[]);
        let selections = UnitSelections::new();

        assert!(selections.resolve(&product).is_none());
        assert!(UnitSelections::default_unit(&product).is_none());
    }

    #[test]
    fn selections_are_scoped_per_product() {
        let p1 = product_with_units(&["250ml", "500ml"]);
        let mut p2 = product_with_units(&["250ml", "500ml"]);
        p2.sku = "P2".to_string();

        let mut selections = UnitSelections::new();
        selections.record(&p1, "500ml");

        assert_eq!(selections.resolve(&p1).expect("units").unit, "500ml");
        assert_eq!(selections.resolve(&p2).expect("units").unit, "250ml");
    }
}
