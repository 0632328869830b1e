/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing with a per-account salt
/// - [`jwt`]: JWT token generation and validation
/// - [`credentials`]: the credential manager owning the signing secret
/// - [`middleware`]: bearer token extraction and the authenticated actor
///
/// # Example
///
/// ```no_run
/// use meetuj_shared::auth::credentials::CredentialManager;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialManager::new(std::env::var("JWT_SECRET")?);
///
/// let hashed = credentials.hash_password("user_password")?;
/// assert!(credentials.verify_password("user_password", &hashed.hash, &hashed.salt)?);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
