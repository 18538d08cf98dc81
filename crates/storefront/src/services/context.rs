//! Session context resolution.
//!
//! Every page of the storefront operates on behalf of a tenant, identified
//! by a tenant id and a security access token. Both arrive either in the
//! page's query string (first navigation from the messaging channel) or in
//! the visitor's session from an earlier navigation. Resolution itself is a
//! pure function; the session reads/writes live in the axum extractor
//! ([`crate::middleware::auth`]).

use thiserror::Error;

/// Errors resolving the tenant context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Tenant id or access token missing from both the query string and the
    /// session. Fatal to the page; no network calls may be issued.
    #[error("missing authentication information")]
    MissingContext,
}

/// Resolved tenant identity for backend calls.
///
/// Implements `Debug` manually to keep the access token out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Security access token scoping the cart.
    pub access_token: String,
}

impl std::fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantContext")
            .field("tenant_id", &self.tenant_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of a successful context resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    /// The resolved identity.
    pub context: TenantContext,
    /// Whether the query string contributed, in which case both values must
    /// be written back to the session for subsequent navigations.
    pub persist: bool,
}

/// Resolve the tenant context from query parameters and stored values.
///
/// Each value is taken preferentially from the query string, falling back
/// to the session. Empty strings count as absent.
///
/// # Errors
///
/// Returns [`AuthError::MissingContext`] if either value is missing after
/// both lookups.
pub fn resolve_context(
    query_tenant: Option<String>,
    query_token: Option<String>,
    stored_tenant: Option<String>,
    stored_token: Option<String>,
) -> Result<ResolvedContext, AuthError> {
    let query_tenant = non_empty(query_tenant);
    let query_token = non_empty(query_token);
    let persist = query_tenant.is_some() || query_token.is_some();

    let tenant_id = query_tenant
        .or_else(|| non_empty(stored_tenant))
        .ok_or(AuthError::MissingContext)?;
    let access_token = query_token
        .or_else(|| non_empty(stored_token))
        .ok_or(AuthError::MissingContext)?;

    Ok(ResolvedContext {
        context: TenantContext {
            tenant_id,
            access_token,
        },
        persist,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn query_values_win_over_stored_values() {
        let resolved = resolve_context(some("t-query"), some("tok-query"), some("t-old"), some("tok-old"))
            .expect("resolves");
        assert_eq!(resolved.context.tenant_id, "t-query");
        assert_eq!(resolved.context.access_token, "tok-query");
        assert!(resolved.persist);
    }

    #[test]
    fn stored_values_used_when_query_absent() {
        let resolved =
            resolve_context(None, None, some("t1"), some("tok1")).expect("resolves");
        assert_eq!(resolved.context.tenant_id, "t1");
        assert_eq!(resolved.context.access_token, "tok1");
        assert!(!resolved.persist);
    }

    #[test]
    fn mixed_sources_resolve_per_value() {
        let resolved =
            resolve_context(some("t-query"), None, None, some("tok1")).expect("resolves");
        assert_eq!(resolved.context.tenant_id, "t-query");
        assert_eq!(resolved.context.access_token, "tok1");
        assert!(resolved.persist);
    }

    #[test]
    fn missing_token_everywhere_is_an_auth_error() {
        let err = resolve_context(some("t1"), None, None, None).expect_err("fails");
        assert_eq!(err, AuthError::MissingContext);
    }

    #[test]
    fn missing_everything_is_an_auth_error() {
        assert_eq!(
            resolve_context(None, None, None, None),
            Err(AuthError::MissingContext)
        );
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let err = resolve_context(some(""), some("tok"), some(""), None).expect_err("fails");
        assert_eq!(err, AuthError::MissingContext);
    }

    #[test]
    fn debug_redacts_access_token() {
        let ctx = TenantContext {
            tenant_id: "t1".to_string(),
            access_token: "super-secret".to_string(),
        };
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
