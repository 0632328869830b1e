/// Credential manager
///
/// Owns the process-wide signing secret and token lifetime, and exposes the
/// four credential operations used by the rest of the system: hashing and
/// verifying passwords, issuing and verifying bearer tokens.
///
/// The secret is passed in at construction; tests build managers with
/// distinct secrets.
///
/// # Example
///
/// ```
/// use meetuj_shared::auth::credentials::CredentialManager;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialManager::new("a-secret-that-is-at-least-32-bytes!!");
/// let account_id = Uuid::new_v4();
///
/// let token = credentials.issue_default_token(account_id)?;
/// assert_eq!(credentials.verify_token(&token)?, account_id);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use uuid::Uuid;

use super::jwt::{self, Claims, JwtError};
use super::password::{self, HashedPassword, PasswordError};

/// Internal reasons a credential was rejected
///
/// Callers must not expose the variant to clients; every variant is reported
/// externally as the same generic "unauthorized" response.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Token rejected
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Password did not match the stored hash
    #[error("Wrong password")]
    WrongPassword,

    /// No account with the supplied email
    #[error("Unknown account")]
    UnknownAccount,

    /// Authorization header missing or not a bearer token
    #[error("Missing bearer token")]
    MissingToken,
}

impl CredentialError {
    /// Short machine-readable kind for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialError::Token(JwtError::BadSignature) => "bad_signature",
            CredentialError::Token(JwtError::Expired) => "expired",
            CredentialError::Token(JwtError::Malformed(_)) => "malformed",
            CredentialError::Token(JwtError::MissingSubject) => "missing_subject",
            CredentialError::Token(JwtError::InvalidIssuer) => "invalid_issuer",
            CredentialError::Token(JwtError::CreateError(_)) => "create_error",
            CredentialError::WrongPassword => "wrong_password",
            CredentialError::UnknownAccount => "unknown_account",
            CredentialError::MissingToken => "missing_token",
        }
    }
}

/// Password hashing and bearer token issuance/verification
#[derive(Clone)]
pub struct CredentialManager {
    secret: String,
    token_ttl: Duration,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl CredentialManager {
    /// Creates a manager with the default 30 minute token lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_token_ttl(secret, Duration::minutes(jwt::DEFAULT_EXPIRE_MINUTES))
    }

    /// Creates a manager with a custom token lifetime
    pub fn with_token_ttl(secret: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            token_ttl,
        }
    }

    /// Configured token lifetime
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hashes a plaintext password with a fresh 64-character salt
    pub fn hash_password(&self, plaintext: &str) -> Result<HashedPassword, PasswordError> {
        password::hash_password(plaintext)
    }

    /// Verifies a plaintext password against a stored hash and salt
    pub fn verify_password(
        &self,
        plaintext: &str,
        hash: &str,
        salt: &str,
    ) -> Result<bool, PasswordError> {
        password::verify_password(plaintext, hash, salt)
    }

    /// Burns one verification against a decoy hash; never matches
    pub fn verify_decoy(&self, plaintext: &str) -> Result<bool, PasswordError> {
        password::verify_decoy(plaintext)
    }

    /// Issues a signed token for `account_id` expiring `ttl` from now
    pub fn issue_token(&self, account_id: Uuid, ttl: Duration) -> Result<String, JwtError> {
        jwt::create_token(&Claims::with_expiration(account_id, ttl), &self.secret)
    }

    /// Issues a signed token with the configured lifetime
    pub fn issue_default_token(&self, account_id: Uuid) -> Result<String, JwtError> {
        self.issue_token(account_id, self.token_ttl)
    }

    /// Verifies a token and returns the account identifier it was issued for
    ///
    /// # Errors
    ///
    /// `CredentialError::Token` with the specific rejection reason
    pub fn verify_token(&self, token: &str) -> Result<Uuid, CredentialError> {
        let claims = jwt::validate_token(token, &self.secret)?;
        claims
            .sub
            .ok_or(CredentialError::Token(JwtError::MissingSubject))
    }
}
