/// Account operations: registration, login and profile management
///
/// Emails are normalized before validation, lookup and storage. Password
/// hashing and verification run on the blocking pool.
///
/// # Example
///
/// ```no_run
/// use meetuj_shared::auth::credentials::CredentialManager;
/// use meetuj_shared::services::accounts;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialManager::new("a-secret-that-is-at-least-32-bytes!!");
///
/// accounts::register(&pool, &credentials, "Alice@Example.com", "correct horse").await?;
/// let token = accounts::login(&pool, &credentials, "alice@example.com", "correct horse").await?;
/// assert_eq!(token.token_type, "bearer");
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::auth::credentials::{CredentialError, CredentialManager};
use crate::auth::password::{validate_password_length, HashedPassword};
use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::models::account::{normalize_email, Account, CreateAccount, UpdateAccount};

use super::Pagination;

/// Longest stored profile picture reference
pub const MAX_PICTURE_REF_LENGTH: usize = 512;

/// Token handed out by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,

    /// Always `"bearer"`
    pub token_type: &'static str,

    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Requested profile changes; absent fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,

    /// New plaintext password
    pub password: Option<String>,

    /// New picture reference; an empty string clears it
    pub profile_picture: Option<String>,
}

/// Normalizes and validates an email address
pub fn validated_email(raw: &str) -> ServiceResult<String> {
    let email = normalize_email(raw);

    if !email.as_str().validate_email() {
        return Err(ServiceError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }

    Ok(email)
}

async fn hash_on_blocking_pool(
    credentials: &CredentialManager,
    password: &str,
) -> ServiceResult<HashedPassword> {
    let credentials = credentials.clone();
    let password = password.to_owned();

    let hashed =
        tokio::task::spawn_blocking(move || credentials.hash_password(&password)).await??;
    Ok(hashed)
}

/// Registers a new account
///
/// # Errors
///
/// - `InvalidInput` for a malformed email or a short password
/// - `Conflict` if the normalized email is already registered
pub async fn register(
    pool: &PgPool,
    credentials: &CredentialManager,
    email: &str,
    password: &str,
) -> ServiceResult<Account> {
    let email = validated_email(email)?;
    validate_password_length(password).map_err(ServiceError::InvalidInput)?;

    if Account::find_by_email(pool, &email).await?.is_some() {
        return Err(ServiceError::Conflict("Email already registered".to_string()));
    }

    let hashed = hash_on_blocking_pool(credentials, password).await?;

    // A concurrent registration can still win the race; the unique
    // constraint then maps to the same Conflict.
    let account = Account::create(
        pool,
        CreateAccount {
            email,
            password_hash: hashed.hash,
            password_salt: hashed.salt,
        },
    )
    .await?;

    info!(account_id = %account.id, "Account registered");
    Ok(account)
}

/// Checks a password against stored credentials
///
/// Exactly one Argon2 verification runs whether or not the account exists,
/// so an unknown email and a wrong password cost the same time.
fn check_password(
    credentials: &CredentialManager,
    stored: Option<(&str, &str)>,
    plaintext: &str,
) -> ServiceResult<()> {
    match stored {
        Some((hash, salt)) => {
            if credentials.verify_password(plaintext, hash, salt)? {
                Ok(())
            } else {
                Err(CredentialError::WrongPassword.into())
            }
        }
        None => {
            credentials.verify_decoy(plaintext)?;
            Err(CredentialError::UnknownAccount.into())
        }
    }
}

/// Checks an email/password pair
///
/// Unknown email and wrong password are distinct internally but both surface
/// as `InvalidCredential`.
pub async fn authenticate(
    pool: &PgPool,
    credentials: &CredentialManager,
    email: &str,
    password: &str,
) -> ServiceResult<Account> {
    let email = normalize_email(email);
    let account = Account::find_by_email(pool, &email).await?;

    let verifier = credentials.clone();
    let plaintext = password.to_owned();
    let stored = account
        .as_ref()
        .map(|a| (a.password_hash.clone(), a.password_salt.clone()));

    let checked = tokio::task::spawn_blocking(move || {
        let stored = stored.as_ref().map(|(hash, salt)| (hash.as_str(), salt.as_str()));
        check_password(&verifier, stored, &plaintext)
    })
    .await?;

    if let Err(ServiceError::InvalidCredential(ref cause)) = checked {
        debug!(kind = cause.kind(), "Login rejected");
    }
    checked?;

    account.ok_or_else(|| CredentialError::UnknownAccount.into())
}

/// Authenticates and issues a bearer token with the configured lifetime
pub async fn login(
    pool: &PgPool,
    credentials: &CredentialManager,
    email: &str,
    password: &str,
) -> ServiceResult<IssuedToken> {
    let account = authenticate(pool, credentials, email, password).await?;
    let access_token = credentials.issue_default_token(account.id)?;

    info!(account_id = %account.id, "Login succeeded");

    Ok(IssuedToken {
        access_token,
        token_type: "bearer",
        expires_in: credentials.token_ttl().num_seconds(),
    })
}

/// Loads an account by ID
pub async fn get_account(pool: &PgPool, id: Uuid) -> ServiceResult<Account> {
    Account::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, id))
}

/// Loads an account by email (normalized before lookup)
pub async fn find_by_email(pool: &PgPool, email: &str) -> ServiceResult<Account> {
    let email = normalize_email(email);

    Account::find_by_email(pool, &email)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, email))
}

/// Lists accounts, oldest first
pub async fn list_accounts(pool: &PgPool, page: Pagination) -> ServiceResult<Vec<Account>> {
    let page = page.clamped();
    Ok(Account::list(pool, page.limit, page.skip).await?)
}

/// Applies profile changes to the actor's own account
///
/// # Errors
///
/// - `InvalidInput` for a malformed email, a short password or an overlong
///   picture reference
/// - `Conflict` if the new email belongs to another account
/// - `NotFound` if the account no longer exists
pub async fn update_profile(
    pool: &PgPool,
    credentials: &CredentialManager,
    account_id: Uuid,
    changes: ProfileChanges,
) -> ServiceResult<Account> {
    let mut update = UpdateAccount::default();

    if let Some(raw) = changes.email.as_deref() {
        let email = validated_email(raw)?;

        if let Some(existing) = Account::find_by_email(pool, &email).await? {
            if existing.id != account_id {
                return Err(ServiceError::Conflict("Email already registered".to_string()));
            }
        }
        update.email = Some(email);
    }

    if let Some(password) = changes.password.as_deref() {
        validate_password_length(password).map_err(ServiceError::InvalidInput)?;
        let hashed = hash_on_blocking_pool(credentials, password).await?;
        update.password = Some((hashed.hash, hashed.salt));
    }

    if let Some(picture) = changes.profile_picture {
        let picture = picture.trim().to_string();
        if picture.len() > MAX_PICTURE_REF_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "Profile picture reference must be at most {} characters",
                MAX_PICTURE_REF_LENGTH
            )));
        }
        update.profile_picture = Some((!picture.is_empty()).then_some(picture));
    }

    if update.is_empty() {
        return get_account(pool, account_id).await;
    }

    let account = Account::update(pool, account_id, update)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, account_id))?;

    info!(account_id = %account.id, "Profile updated");
    Ok(account)
}

/// Records (or clears) the stored picture path of an account
pub async fn set_profile_picture(
    pool: &PgPool,
    account_id: Uuid,
    path: Option<String>,
) -> ServiceResult<Account> {
    let update = UpdateAccount {
        profile_picture: Some(path),
        ..Default::default()
    };

    Account::update(pool, account_id, update)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, account_id))
}

/// Deletes an account together with its meetings and links
pub async fn delete_account(pool: &PgPool, account_id: Uuid) -> ServiceResult<()> {
    if !Account::delete(pool, account_id).await? {
        return Err(ServiceError::not_found(EntityKind::Account, account_id));
    }

    info!(%account_id, "Account deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_validated_email_normalizes() {
        assert_eq!(
            validated_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_validated_email_rejects_garbage() {
        for raw in ["", "   ", "not-an-email", "a@", "@b.com"] {
            let err = validated_email(raw).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{raw:?}");
        }
    }

    #[test]
    fn test_both_login_failures_run_the_verifier() {
        let credentials = CredentialManager::new("accounts-secret-accounts-secret-32");
        let hashed = credentials.hash_password("correct horse battery").unwrap();
        let stored = Some((hashed.hash.as_str(), hashed.salt.as_str()));

        assert!(check_password(&credentials, stored, "correct horse battery").is_ok());

        let started = Instant::now();
        let wrong = check_password(&credentials, stored, "wrong horse battery").unwrap_err();
        let wrong_elapsed = started.elapsed();

        let started = Instant::now();
        let unknown = check_password(&credentials, None, "wrong horse battery").unwrap_err();
        let unknown_elapsed = started.elapsed();

        assert!(matches!(
            wrong,
            ServiceError::InvalidCredential(CredentialError::WrongPassword)
        ));
        assert!(matches!(
            unknown,
            ServiceError::InvalidCredential(CredentialError::UnknownAccount)
        ));

        // Without the decoy the unknown path is microseconds against a
        // hash that takes tens of milliseconds or more
        assert!(
            unknown_elapsed * 10 >= wrong_elapsed,
            "unknown={unknown_elapsed:?} wrong={wrong_elapsed:?}"
        );
    }

    #[test]
    fn test_issued_token_serializes_bearer() {
        let token = IssuedToken {
            access_token: "abc".to_string(),
            token_type: "bearer",
            expires_in: 1800,
        };

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 1800);
    }
}
