//! Session-stored state.
//!
//! The session is the storefront's persisted client storage: it carries the
//! tenant context between navigations (so the query string is only needed
//! once) and the visitor's explicit unit selections.

use tower_sessions::Session;

use chatcart_core::UnitSelections;

/// Session keys for stored values.
pub mod keys {
    /// Key for the resolved tenant id.
    pub const TENANT_ID: &str = "tenant_id";

    /// Key for the resolved security access token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the visitor's explicit unit selections.
    pub const UNIT_SELECTIONS: &str = "unit_selections";
}

/// Load the visitor's unit selections, empty if none are stored.
pub async fn load_selections(session: &Session) -> UnitSelections {
    session
        .get::<UnitSelections>(keys::UNIT_SELECTIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the visitor's unit selections.
pub async fn save_selections(session: &Session, selections: &UnitSelections) {
    if let Err(e) = session.insert(keys::UNIT_SELECTIONS, selections).await {
        tracing::error!("Failed to save unit selections to session: {e}");
    }
}
