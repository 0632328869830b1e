/// Meeting model and participant set
///
/// # Schema
///
/// ```sql
/// CREATE TABLE meetings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
///     starts_at TIMESTAMPTZ NOT NULL,
///     duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE meeting_participants (
///     meeting_id UUID NOT NULL REFERENCES meetings (id) ON DELETE CASCADE,
///     account_id UUID NOT NULL REFERENCES accounts (id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (meeting_id, account_id)
/// );
/// ```
///
/// The owner is always inserted as a participant when a meeting is created.
/// Functions that take a `&mut PgConnection` are meant to run inside the
/// caller's transaction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::account::Account;

const MEETING_COLUMNS: &str =
    "m.id, m.title, m.owner_id, m.starts_at, m.duration_minutes, m.created_at, m.updated_at";

/// Owned, time-boxed scheduled event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: Uuid,

    pub title: String,

    /// Owning account; the only account allowed to edit or delete
    pub owner_id: Uuid,

    /// Start instant (inclusive)
    pub starts_at: DateTime<Utc>,

    /// Length in minutes
    pub duration_minutes: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// End instant (exclusive)
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.starts_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }
}

/// Input for creating a meeting
#[derive(Debug, Clone)]
pub struct CreateMeeting {
    pub title: String,
    pub owner_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Input for updating a meeting; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMeeting {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

impl UpdateMeeting {
    /// Whether the update moves or resizes the meeting
    pub fn reschedules(&self) -> bool {
        self.starts_at.is_some() || self.duration_minutes.is_some()
    }
}

impl Meeting {
    /// Inserts a meeting and its owner as first participant
    pub async fn create(conn: &mut PgConnection, data: CreateMeeting) -> Result<Self, sqlx::Error> {
        let meeting = sqlx::query_as::<_, Meeting>(
            r#"
            INSERT INTO meetings (title, owner_id, starts_at, duration_minutes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, owner_id, starts_at, duration_minutes, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.owner_id)
        .bind(data.starts_at)
        .bind(data.duration_minutes)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("INSERT INTO meeting_participants (meeting_id, account_id) VALUES ($1, $2)")
            .bind(meeting.id)
            .bind(meeting.owner_id)
            .execute(&mut *conn)
            .await?;

        Ok(meeting)
    }

    /// Finds a meeting by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM meetings m WHERE m.id = $1", MEETING_COLUMNS);

        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a meeting by ID and locks its row
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM meetings m WHERE m.id = $1 FOR UPDATE",
            MEETING_COLUMNS
        );

        sqlx::query_as::<_, Meeting>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Lists every meeting owned by an account, ordered by start
    pub async fn list_owned_by(
        conn: &mut PgConnection,
        owner_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM meetings m WHERE m.owner_id = $1 ORDER BY m.starts_at",
            MEETING_COLUMNS
        );

        sqlx::query_as::<_, Meeting>(&query)
            .bind(owner_id)
            .fetch_all(conn)
            .await
    }

    /// Lists every meeting an account participates in (owned included)
    pub async fn list_attended_by(
        conn: &mut PgConnection,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM meetings m \
             JOIN meeting_participants p ON p.meeting_id = m.id \
             WHERE p.account_id = $1 ORDER BY m.starts_at",
            MEETING_COLUMNS
        );

        sqlx::query_as::<_, Meeting>(&query)
            .bind(account_id)
            .fetch_all(conn)
            .await
    }

    /// Paginated list of meetings an account participates in
    pub async fn list_for_participant(
        pool: &PgPool,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM meetings m \
             JOIN meeting_participants p ON p.meeting_id = m.id \
             WHERE p.account_id = $1 ORDER BY m.starts_at, m.id LIMIT $2 OFFSET $3",
            MEETING_COLUMNS
        );

        sqlx::query_as::<_, Meeting>(&query)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Updates a meeting; only non-None fields are written
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: UpdateMeeting,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE meetings SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.starts_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", starts_at = ${}", bind_count));
        }
        if data.duration_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", duration_minutes = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, owner_id, starts_at, duration_minutes, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Meeting>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(starts_at) = data.starts_at {
            q = q.bind(starts_at);
        }
        if let Some(duration) = data.duration_minutes {
            q = q.bind(duration);
        }

        q.fetch_optional(conn).await
    }

    /// Deletes a meeting; participant rows cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All participants, owner included, in the order they were added
    pub async fn participants(pool: &PgPool, meeting_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT a.id, a.email, a.password_hash, a.password_salt, a.profile_picture,
                   a.created_at, a.updated_at
            FROM meeting_participants p
            JOIN accounts a ON a.id = p.account_id
            WHERE p.meeting_id = $1
            ORDER BY p.added_at, a.id
            "#,
        )
        .bind(meeting_id)
        .fetch_all(pool)
        .await
    }

    /// Adds a participant
    ///
    /// # Returns
    ///
    /// False if the account was already a participant
    pub async fn add_participant(
        conn: &mut PgConnection,
        meeting_id: Uuid,
        account_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO meeting_participants (meeting_id, account_id) VALUES ($1, $2) \
             ON CONFLICT (meeting_id, account_id) DO NOTHING",
        )
        .bind(meeting_id)
        .bind(account_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a participant
    ///
    /// # Returns
    ///
    /// False if the account was not a participant
    pub async fn remove_participant(
        pool: &PgPool,
        meeting_id: Uuid,
        account_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM meeting_participants WHERE meeting_id = $1 AND account_id = $2",
        )
        .bind(meeting_id)
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
