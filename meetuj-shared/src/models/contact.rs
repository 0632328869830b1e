/// Contact links between accounts
///
/// A contact relationship is undirected but stored as two directed rows,
/// `(a, b)` and `(b, a)`, always written and removed together.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contact_links (
///     account_id UUID NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
///     contact_id UUID NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (account_id, contact_id),
///     CHECK (account_id <> contact_id)
/// );
/// ```

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::account::Account;

/// Contact link operations
pub struct ContactLink;

impl ContactLink {
    /// Lists the contacts of an account, ordered by email
    pub async fn list_contacts(pool: &PgPool, account_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.email, a.password_hash, a.password_salt, a.profile_picture,
                   a.created_at, a.updated_at
            FROM contact_links c
            JOIN accounts a ON a.id = c.contact_id
            WHERE c.account_id = $1
            ORDER BY a.email
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// Checks whether two accounts are linked
    pub async fn exists(
        conn: &mut PgConnection,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM contact_links WHERE account_id = $1 AND contact_id = $2)",
        )
        .bind(account_id)
        .bind(contact_id)
        .fetch_one(conn)
        .await
    }

    /// Inserts both directed rows
    ///
    /// Must run inside a transaction so the pair is written atomically.
    pub async fn link(
        conn: &mut PgConnection,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO contact_links (account_id, contact_id) VALUES ($1, $2), ($2, $1)",
        )
        .bind(account_id)
        .bind(contact_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Removes both directed rows
    ///
    /// # Returns
    ///
    /// Number of rows removed (0 when the accounts were not linked)
    pub async fn unlink(
        conn: &mut PgConnection,
        account_id: Uuid,
        contact_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM contact_links
            WHERE (account_id = $1 AND contact_id = $2)
               OR (account_id = $2 AND contact_id = $1)
            "#,
        )
        .bind(account_id)
        .bind(contact_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
