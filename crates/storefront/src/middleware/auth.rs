//! Tenant context extraction.
//!
//! [`RequireTenant`] resolves the tenant id and access token from the
//! request's query string (the backend's legacy `tenentId` /
//! `securityaccessToken` parameter spellings) with session fallback, and
//! mirrors query-sourced values back into the session so subsequent
//! navigations work without the query string.
//!
//! Resolution failure rejects with [`crate::error::AppError::Auth`], which
//! renders a blocking error page; handlers behind this extractor never run
//! without a full context, so no network calls are issued for
//! unauthenticated requests.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session::keys;
use crate::services::context::{TenantContext, resolve_context};

/// Extractor yielding the resolved tenant context.
#[derive(Debug, Clone)]
pub struct RequireTenant(pub TenantContext);

/// Query-string spellings used by the messaging channel's deep links.
#[derive(Debug, Default, Deserialize)]
struct ContextQuery {
    #[serde(rename = "tenentId")]
    tenant_id: Option<String>,
    #[serde(rename = "securityaccessToken")]
    access_token: Option<String>,
}

impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        // Unknown/malformed query strings are not an error here; the session
        // may still carry a full context.
        let query = Query::<ContextQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let stored_tenant = session.get::<String>(keys::TENANT_ID).await.ok().flatten();
        let stored_token = session
            .get::<String>(keys::ACCESS_TOKEN)
            .await
            .ok()
            .flatten();

        let resolved = resolve_context(
            query.tenant_id,
            query.access_token,
            stored_tenant,
            stored_token,
        )?;

        if resolved.persist {
            if let Err(e) = session
                .insert(keys::TENANT_ID, &resolved.context.tenant_id)
                .await
            {
                tracing::error!("Failed to persist tenant id to session: {e}");
            }
            if let Err(e) = session
                .insert(keys::ACCESS_TOKEN, &resolved.context.access_token)
                .await
            {
                tracing::error!("Failed to persist access token to session: {e}");
            }
        }

        Ok(Self(resolved.context))
    }
}
