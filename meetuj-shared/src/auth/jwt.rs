/// JWT token generation and validation module
///
/// Access tokens are signed with HS256 (HMAC-SHA256) and carry the account
/// identifier as the `sub` claim.
///
/// # Security
///
/// - **Algorithm**: HS256
/// - **Expiration**: 30 minutes by default, no validation leeway
/// - **Validation**: signature, expiration, not-before, issuer, subject
/// - **Secret Management**: secrets should be at least 32 bytes
///
/// # Example
///
/// ```
/// use meetuj_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let account_id = Uuid::new_v4();
///
/// let claims = Claims::new(account_id);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, Some(account_id));
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every token
pub const ISSUER: &str = "meetuj";

/// Default access token lifetime in minutes
pub const DEFAULT_EXPIRE_MINUTES: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature does not match the signing secret
    #[error("Token signature mismatch")]
    BadSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token could not be decoded
    #[error("Invalid token format: {0}")]
    Malformed(String),

    /// Token carries no account identifier
    #[error("Token has no subject")]
    MissingSubject,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// - `sub`: account ID (optional on decode so a missing subject is reported
///   as its own error kind)
/// - `iss`: always "meetuj"
/// - `iat`, `nbf`, `exp`: Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Account ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Uuid>,

    /// Issuer
    pub iss: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Not before
    pub nbf: i64,
}

impl Claims {
    /// Creates claims with the default expiration
    pub fn new(account_id: Uuid) -> Self {
        Self::with_expiration(account_id, Duration::minutes(DEFAULT_EXPIRE_MINUTES))
    }

    /// Creates claims expiring `expires_in` from now
    ///
    /// # Example
    ///
    /// ```
    /// use meetuj_shared::auth::jwt::Claims;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(Uuid::new_v4(), Duration::hours(1));
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(account_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: Some(account_id),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    ///
    /// A token is only valid strictly before its expiration instant.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts its claims
///
/// Verifies signature, issuer, `nbf` and `exp` (without leeway). A token
/// whose `sub` claim is absent is rejected with `JwtError::MissingSubject`.
///
/// # Errors
///
/// Each failure maps to a distinct `JwtError` variant.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => JwtError::BadSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::Malformed(e.to_string()),
    })?;

    let claims = token_data.claims;

    // jsonwebtoken accepts exp == now; tokens are only valid before exp
    if claims.is_expired() {
        return Err(JwtError::Expired);
    }

    if claims.sub.is_none() {
        return Err(JwtError::MissingSubject);
    }

    Ok(claims)
}
