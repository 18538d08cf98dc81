//! Cart domain types.
//!
//! The backend's cart payload is the only source of truth. A [`CartState`]
//! is rebuilt wholesale from every authoritative payload by coalescing raw
//! entries that share a unit SKU; it is never patched by local arithmetic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw cart entry as returned by the backend.
///
/// The backend may return several entries sharing a SKU (historical
/// duplicates); coalescing them is a required reconciliation step, not an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unit-specific SKU.
    pub sku: String,
    /// Product display name.
    #[serde(default)]
    pub product_name: String,
    /// Line quantity; may be zero or negative in degenerate payloads.
    pub quantity: i64,
    /// Unit price at the time the line was created.
    #[serde(default)]
    pub price: Decimal,
    /// Unit label the line was created under.
    #[serde(default)]
    pub selected_unit: Option<String>,
}

/// One coalesced cart line, keyed by unit SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unit-specific SKU (the cart key).
    pub sku: String,
    /// Product display name.
    pub product_name: String,
    /// Positive quantity; a zero line is removed, never stored.
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
    /// Unit label, retained for update/remove calls that require it.
    pub selected_unit: Option<String>,
}

/// Coalesced snapshot of the authoritative cart.
///
/// Owned exclusively by the cart service; rendering code reads it through
/// the accessors below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    lines: BTreeMap<String, CartLine>,
}

impl CartState {
    /// Build a snapshot from a raw backend payload.
    ///
    /// Entries sharing a SKU are merged by summing quantities; the last-seen
    /// unit label, name, and price win. Entries whose summed quantity is not
    /// positive are dropped.
    #[must_use]
    pub fn coalesce(items: Vec<CartItem>) -> Self {
        let mut lines: BTreeMap<String, CartLine> = BTreeMap::new();

        for item in items {
            let quantity = u32::try_from(item.quantity.max(0)).unwrap_or(0);
            match lines.get_mut(&item.sku) {
                Some(line) => {
                    line.quantity = line.quantity.saturating_add(quantity);
                    line.product_name = item.product_name;
                    line.price = item.price;
                    if item.selected_unit.is_some() {
                        line.selected_unit = item.selected_unit;
                    }
                }
                None => {
                    lines.insert(
                        item.sku.clone(),
                        CartLine {
                            sku: item.sku,
                            product_name: item.product_name,
                            quantity,
                            price: item.price,
                            selected_unit: item.selected_unit,
                        },
                    );
                }
            }
        }

        lines.retain(|_, line| line.quantity > 0);

        Self { lines }
    }

    /// Whether a line exists for the given unit SKU.
    #[must_use]
    pub fn has_line(&self, sku: &str) -> bool {
        self.lines.contains_key(sku)
    }

    /// Quantity of the given unit SKU, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, sku: &str) -> u32 {
        self.lines.get(sku).map_or(0, |line| line.quantity)
    }

    /// The full line for a unit SKU, if present.
    #[must_use]
    pub fn line(&self, sku: &str) -> Option<&CartLine> {
        self.lines.get(sku)
    }

    /// Number of distinct coalesced lines (not total quantity).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the "view cart" affordance should be shown.
    #[must_use]
    pub fn show_cart(&self) -> bool {
        self.line_count() > 0
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .values()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Iterate lines in stable (SKU) order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, quantity: i64, unit: Option<&str>) -> CartItem {
        CartItem {
            sku: sku.to_string(),
            product_name: "Cold Brew".to_string(),
            quantity,
            price: Decimal::from(100),
            selected_unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn duplicate_skus_coalesce_by_summing_quantities() {
        let cart = CartState::coalesce(vec![item("X", 2, Some("A")), item("X", 1, Some("A"))]);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("X"), 3);
        assert_eq!(
            cart.line("X").and_then(|l| l.selected_unit.as_deref()),
            Some("A")
        );
    }

    #[test]
    fn line_count_counts_distinct_lines_not_total_quantity() {
        let cart = CartState::coalesce(vec![item("X", 5, None), item("Y", 2, None)]);

        assert_eq!(cart.line_count(), 2);
        assert!(cart.show_cart());
    }

    #[test]
    fn last_seen_unit_label_wins() {
        let cart = CartState::coalesce(vec![item("X", 1, Some("A")), item("X", 1, Some("B"))]);

        assert_eq!(
            cart.line("X").and_then(|l| l.selected_unit.as_deref()),
            Some("B")
        );
        assert_eq!(cart.quantity_of("X"), 2);
    }

    #[test]
    fn zero_and_negative_quantities_do_not_create_lines() {
        let cart = CartState::coalesce(vec![item("X", 0, None), item("Y", -3, None)]);

        assert_eq!(cart.line_count(), 0);
        assert!(!cart.show_cart());
        assert!(!cart.has_line("X"));
    }

    #[test]
    fn empty_payload_yields_empty_state() {
        let cart = CartState::coalesce(Vec::new());
        assert_eq!(cart, CartState::default());
        assert_eq!(cart.quantity_of("anything"), 0);
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let mut expensive = item("X", 2, None);
        expensive.price = Decimal::new(10050, 2); // 100.50
        let cart = CartState::coalesce(vec![expensive, item("Y", 1, None)]);

        assert_eq!(cart.subtotal(), Decimal::new(30100, 2)); // 201.00 + 100.00
    }

    #[test]
    fn identical_payloads_build_identical_states() {
        let payload = vec![item("X", 2, Some("A")), item("Y", 1, None)];
        let first = CartState::coalesce(payload.clone());
        let second = CartState::coalesce(payload);
        assert_eq!(first, second);
    }
}
