/// Account model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(320) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     password_salt VARCHAR(64) NOT NULL,
///     profile_picture VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Emails are normalized with [`normalize_email`] before they reach this
/// module, so the plain unique constraint is case-insensitive in effect.
///
/// # Example
///
/// ```no_run
/// use meetuj_shared::models::account::{Account, CreateAccount};
/// use meetuj_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(
///     &pool,
///     CreateAccount {
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         password_salt: "S".repeat(64),
///     },
/// )
/// .await?;
///
/// let found = Account::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|a| a.id), Some(account.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, password_salt, profile_picture, created_at, updated_at";

/// Registered account
///
/// Never serialize this type to clients directly; it carries the password
/// hash and salt.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID (UUID v4)
    pub id: Uuid,

    /// Normalized email address, unique across accounts
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// 64-character alphanumeric salt appended to the password before hashing
    pub password_salt: String,

    /// Stored profile picture path, if one was uploaded
    pub profile_picture: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Public projection of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            profile_picture: account.profile_picture,
            created_at: account.created_at,
        }
    }
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Normalized email
    pub email: String,

    /// Argon2id hash (NOT plaintext password!)
    pub password_hash: String,

    pub password_salt: String,
}

/// Input for updating an existing account
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub email: Option<String>,

    /// New hash and salt, always replaced together
    pub password: Option<(String, String)>,

    /// New profile picture (use Some(None) to clear)
    pub profile_picture: Option<Option<String>>,
}

impl UpdateAccount {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.profile_picture.is_none()
    }
}

/// Normalizes an email for storage and lookup
///
/// Surrounding whitespace is trimmed and the address is lower-cased, making
/// uniqueness case- and whitespace-insensitive.
///
/// # Example
///
/// ```
/// use meetuj_shared::models::account::normalize_email;
///
/// assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Account {
    /// Creates a new account
    ///
    /// # Errors
    ///
    /// Returns a database error if the email already exists
    /// (`accounts_email_key` unique violation) or the connection fails.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (email, password_hash, password_salt) \
             VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.password_salt)
            .fetch_one(pool)
            .await
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);

        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an account by (already normalized) email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM accounts WHERE email = $1", ACCOUNT_COLUMNS);

        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Locks an account row for the rest of the transaction
    ///
    /// Used to serialize schedule changes per owner. Returns false if the
    /// account does not exist.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(locked.is_some())
    }

    /// Updates an existing account
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed.
    ///
    /// # Returns
    ///
    /// The updated account, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateAccount,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE accounts SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password.is_some() {
            query.push_str(&format!(
                ", password_hash = ${}, password_salt = ${}",
                bind_count + 1,
                bind_count + 2
            ));
            bind_count += 2;
        }
        if data.profile_picture.is_some() {
            bind_count += 1;
            query.push_str(&format!(", profile_picture = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", ACCOUNT_COLUMNS));

        let mut q = sqlx::query_as::<_, Account>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some((hash, salt)) = data.password {
            q = q.bind(hash).bind(salt);
        }
        if let Some(picture) = data.profile_picture {
            q = q.bind(picture);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes an account
    ///
    /// Owned meetings, participant rows and contact links are removed by
    /// `ON DELETE CASCADE`.
    ///
    /// # Returns
    ///
    /// True if the account was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists accounts ordered by creation date (oldest first)
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM accounts ORDER BY created_at, id LIMIT $1 OFFSET $2",
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, Account>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
        assert_eq!(normalize_email("USER@Example.com"), "user@example.com");
        assert_eq!(normalize_email("\t user@example.com \n"), "user@example.com");
    }

    #[test]
    fn test_variants_normalize_to_same_key() {
        let variants = ["Bob@Mail.com", " bob@mail.com", "BOB@MAIL.COM  "];
        for variant in variants {
            assert_eq!(normalize_email(variant), "bob@mail.com");
        }
    }

    #[test]
    fn test_update_account_default_is_empty() {
        assert!(UpdateAccount::default().is_empty());

        let update = UpdateAccount {
            profile_picture: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_summary_hides_credentials() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            password_salt: "S".repeat(64),
            profile_picture: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&AccountSummary::from(account)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("SSSS"));
    }
}
