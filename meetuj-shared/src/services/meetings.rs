/// Meeting operations
///
/// Creation and rescheduling run read-check-write in one transaction that
/// first locks the owner's account row, so two concurrent requests from the
/// same owner cannot both pass the overlap check.
///
/// Lock order is always account row, then meeting row.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::models::account::Account;
use crate::models::meeting::{CreateMeeting, Meeting, UpdateMeeting};
use crate::scheduling::{check_conflict, ParticipantPolicy, SchedulingPolicy};

use super::Pagination;

pub const MAX_TITLE_LENGTH: usize = 200;

/// One day
pub const MAX_DURATION_MINUTES: i32 = 24 * 60;

/// Fields of a meeting to be created
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ServiceError::InvalidInput("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }

    Ok(title.to_string())
}

fn validate_duration(duration_minutes: i32) -> ServiceResult<()> {
    if duration_minutes <= 0 || duration_minutes > MAX_DURATION_MINUTES {
        return Err(ServiceError::InvalidInput(format!(
            "Duration must be between 1 and {} minutes",
            MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}

fn require_owner(meeting: &Meeting, actor: Uuid) -> ServiceResult<()> {
    if !meeting.is_owned_by(actor) {
        return Err(ServiceError::Conflict(
            "Only the meeting owner can modify this meeting".to_string(),
        ));
    }
    Ok(())
}

fn require_membership_rights(
    policy: &SchedulingPolicy,
    meeting: &Meeting,
    actor: Uuid,
) -> ServiceResult<()> {
    match policy.participant_changes {
        ParticipantPolicy::Any => Ok(()),
        ParticipantPolicy::Owner => {
            if meeting.is_owned_by(actor) {
                Ok(())
            } else {
                Err(ServiceError::Conflict(
                    "Only the meeting owner can change participants".to_string(),
                ))
            }
        }
    }
}

/// Creates a meeting owned by `owner_id`
///
/// # Errors
///
/// - `InvalidInput` for an empty title or an out-of-range duration
/// - `ScheduleConflict` if the slot overlaps another meeting the owner owns
/// - `NotFound` if the owner account no longer exists
pub async fn create_meeting(
    pool: &PgPool,
    owner_id: Uuid,
    new: NewMeeting,
) -> ServiceResult<Meeting> {
    let title = validate_title(&new.title)?;
    validate_duration(new.duration_minutes)?;

    let mut tx = pool.begin().await?;

    if !Account::lock(&mut *tx, owner_id).await? {
        return Err(ServiceError::not_found(EntityKind::Account, owner_id));
    }

    let owned = Meeting::list_owned_by(&mut *tx, owner_id).await?;
    check_conflict(new.starts_at, new.duration_minutes, &owned)?;

    let meeting = Meeting::create(
        &mut *tx,
        CreateMeeting {
            title,
            owner_id,
            starts_at: new.starts_at,
            duration_minutes: new.duration_minutes,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        meeting_id = %meeting.id,
        %owner_id,
        starts_at = %meeting.starts_at,
        duration_minutes = meeting.duration_minutes,
        "Meeting created"
    );
    Ok(meeting)
}

/// Loads a meeting; any authenticated account may read it
pub async fn get_meeting(pool: &PgPool, meeting_id: Uuid) -> ServiceResult<Meeting> {
    Meeting::find_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Meeting, meeting_id))
}

/// Meetings the account participates in, ordered by start
pub async fn list_meetings(
    pool: &PgPool,
    account_id: Uuid,
    page: Pagination,
) -> ServiceResult<Vec<Meeting>> {
    let page = page.clamped();
    Ok(Meeting::list_for_participant(pool, account_id, page.limit, page.skip).await?)
}

/// Renames or reschedules a meeting; owner only
///
/// A new start or duration re-runs the overlap check against the owner's
/// other meetings.
pub async fn update_meeting(
    pool: &PgPool,
    actor: Uuid,
    meeting_id: Uuid,
    mut changes: UpdateMeeting,
) -> ServiceResult<Meeting> {
    if let Some(title) = changes.title.as_deref() {
        changes.title = Some(validate_title(title)?);
    }
    if let Some(duration) = changes.duration_minutes {
        validate_duration(duration)?;
    }

    let mut tx = pool.begin().await?;

    if !Account::lock(&mut *tx, actor).await? {
        return Err(ServiceError::not_found(EntityKind::Account, actor));
    }

    let meeting = Meeting::find_for_update(&mut *tx, meeting_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Meeting, meeting_id))?;
    require_owner(&meeting, actor)?;

    if changes.reschedules() {
        let starts_at = changes.starts_at.unwrap_or(meeting.starts_at);
        let duration = changes.duration_minutes.unwrap_or(meeting.duration_minutes);

        let others: Vec<Meeting> = Meeting::list_owned_by(&mut *tx, actor)
            .await?
            .into_iter()
            .filter(|m| m.id != meeting_id)
            .collect();
        check_conflict(starts_at, duration, &others)?;
    }

    let updated = Meeting::update(&mut *tx, meeting_id, changes)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Meeting, meeting_id))?;

    tx.commit().await?;

    info!(%meeting_id, "Meeting updated");
    Ok(updated)
}

/// Deletes a meeting; owner only
pub async fn delete_meeting(pool: &PgPool, actor: Uuid, meeting_id: Uuid) -> ServiceResult<()> {
    let meeting = get_meeting(pool, meeting_id).await?;
    require_owner(&meeting, actor)?;

    if !Meeting::delete(pool, meeting_id).await? {
        return Err(ServiceError::not_found(EntityKind::Meeting, meeting_id));
    }

    info!(%meeting_id, "Meeting deleted");
    Ok(())
}

/// Participants of a meeting, owner included
pub async fn list_participants(pool: &PgPool, meeting_id: Uuid) -> ServiceResult<Vec<Account>> {
    get_meeting(pool, meeting_id).await?;
    Ok(Meeting::participants(pool, meeting_id).await?)
}

/// Adds an account to a meeting's participant set
///
/// # Errors
///
/// - `NotFound` if the meeting or the account does not exist
/// - `Conflict` if the account already participates, or the policy limits
///   membership changes to the owner
/// - `ScheduleConflict` if participant conflict checking is enabled and the
///   account attends an overlapping meeting
pub async fn add_participant(
    pool: &PgPool,
    policy: &SchedulingPolicy,
    actor: Uuid,
    meeting_id: Uuid,
    account_id: Uuid,
) -> ServiceResult<Account> {
    let meeting = get_meeting(pool, meeting_id).await?;
    require_membership_rights(policy, &meeting, actor)?;

    let participant = Account::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, account_id))?;

    let mut tx = pool.begin().await?;

    if policy.check_participant_conflicts {
        Account::lock(&mut *tx, account_id).await?;

        let attended: Vec<Meeting> = Meeting::list_attended_by(&mut *tx, account_id)
            .await?
            .into_iter()
            .filter(|m| m.id != meeting_id)
            .collect();
        check_conflict(meeting.starts_at, meeting.duration_minutes, &attended)?;
    }

    if !Meeting::add_participant(&mut *tx, meeting_id, account_id).await? {
        return Err(ServiceError::Conflict(
            "Account already participates in this meeting".to_string(),
        ));
    }

    tx.commit().await?;

    debug!(%meeting_id, %account_id, %actor, "Participant added");
    Ok(participant)
}

/// Removes an account from a meeting's participant set
///
/// The owner cannot be removed from their own meeting.
pub async fn remove_participant(
    pool: &PgPool,
    policy: &SchedulingPolicy,
    actor: Uuid,
    meeting_id: Uuid,
    account_id: Uuid,
) -> ServiceResult<()> {
    let meeting = get_meeting(pool, meeting_id).await?;
    require_membership_rights(policy, &meeting, actor)?;

    if meeting.is_owned_by(account_id) {
        return Err(ServiceError::Conflict(
            "The owner cannot be removed from the meeting".to_string(),
        ));
    }

    if !Meeting::remove_participant(pool, meeting_id, account_id).await? {
        return Err(ServiceError::not_found(EntityKind::Participant, account_id));
    }

    debug!(%meeting_id, %account_id, %actor, "Participant removed");
    Ok(())
}
