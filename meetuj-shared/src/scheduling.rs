/// Scheduling guard
///
/// Rejects a new meeting when it overlaps one of the actor's own meetings.
/// Intervals are half-open, `[start, start + duration)`: back-to-back
/// meetings do not overlap and a zero-length candidate never conflicts.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use meetuj_shared::scheduling::check_conflict;
///
/// let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
/// assert!(check_conflict(start, 60, &[]).is_ok());
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::meeting::Meeting;

/// A new meeting overlaps an existing one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Meeting overlaps '{title}' ({meeting_id}) by {overlap_minutes} minute(s)")]
pub struct ScheduleConflict {
    /// The existing meeting that collides
    pub meeting_id: Uuid,

    pub title: String,

    pub overlap_minutes: i64,
}

/// Who may add or remove participants of a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantPolicy {
    /// Any authenticated account
    #[default]
    Any,

    /// Only the meeting owner
    Owner,
}

impl std::str::FromStr for ParticipantPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(ParticipantPolicy::Any),
            "owner" => Ok(ParticipantPolicy::Owner),
            other => Err(format!("Unknown participant policy '{}', expected 'any' or 'owner'", other)),
        }
    }
}

/// Tunable scheduling rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    pub participant_changes: ParticipantPolicy,

    /// Check an added participant's own schedule for overlaps
    pub check_participant_conflicts: bool,
}

/// Overlap between two half-open intervals; zero or negative means disjoint
pub fn overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> Duration {
    a_end.min(b_end) - a_start.max(b_start)
}

/// Checks a candidate slot against existing meetings
///
/// `existing` is the set to check against, normally the meetings owned by
/// the creating account. A meeting being rescheduled must be filtered out by
/// the caller.
///
/// # Errors
///
/// Returns the first meeting (in slice order) whose overlap with the
/// candidate is strictly positive.
pub fn check_conflict(
    new_start: DateTime<Utc>,
    new_duration_minutes: i32,
    existing: &[Meeting],
) -> Result<(), ScheduleConflict> {
    let new_end = new_start + Duration::minutes(i64::from(new_duration_minutes));

    for meeting in existing {
        let overlap = overlap(new_start, new_end, meeting.starts_at, meeting.ends_at());

        if overlap > Duration::zero() {
            return Err(ScheduleConflict {
                meeting_id: meeting.id,
                title: meeting.title.clone(),
                overlap_minutes: overlap.num_minutes(),
            });
        }
    }

    Ok(())
}
