/// Bearer token authentication for Axum
///
/// Validates `Authorization: Bearer <token>` headers with a
/// [`CredentialManager`] and produces the [`AuthContext`] that the API's
/// middleware layer inserts into request extensions.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use meetuj_shared::auth::credentials::CredentialManager;
/// use meetuj_shared::auth::middleware::authenticate;
/// use uuid::Uuid;
///
/// let credentials = CredentialManager::new("secret");
/// let token = credentials.issue_default_token(Uuid::new_v4()).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
/// assert!(authenticate(&credentials, &headers).is_ok());
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::{CredentialError, CredentialManager};

/// Message returned for every credential failure
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

/// Authenticated actor added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated account ID
    pub account_id: Uuid,
}

impl AuthContext {
    pub fn new(account_id: Uuid) -> Self {
        Self { account_id }
    }
}

/// Extracts the bearer token from an `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the request's bearer token
///
/// Failures are logged with their internal kind and returned unchanged; the
/// API error mapping collapses them into one generic 401.
pub fn authenticate(
    credentials: &CredentialManager,
    headers: &HeaderMap,
) -> Result<AuthContext, CredentialError> {
    let token = bearer_token(headers).ok_or(CredentialError::MissingToken)?;

    let account_id = credentials.verify_token(token).map_err(|e| {
        tracing::debug!(kind = e.kind(), "Rejected bearer token");
        e
    })?;

    Ok(AuthContext::new(account_id))
}
