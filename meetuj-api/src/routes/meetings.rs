/// Meeting endpoints (authenticated)
///
/// - `GET /v1/meetings?skip&limit` - meetings the caller participates in
/// - `POST /v1/meetings` - create; rejected with 409 on overlap
/// - `GET|PUT|DELETE /v1/meetings/:id` - read, owner-only update/delete
/// - `GET /v1/meetings/:id/participants`
/// - `POST|DELETE /v1/meetings/:id/participants/:account_id`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use meetuj_shared::auth::middleware::AuthContext;
use meetuj_shared::models::account::AccountSummary;
use meetuj_shared::models::meeting::{Meeting, UpdateMeeting};
use meetuj_shared::services::meetings::{self, NewMeeting};
use meetuj_shared::services::Pagination;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    pub starts_at: DateTime<Utc>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeetingRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: Option<i32>,
}

pub async fn list_meetings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Meeting>>> {
    let meetings = meetings::list_meetings(&state.db, auth.account_id, page).await?;
    Ok(Json(meetings))
}

/// Create a meeting owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /v1/meetings
///
/// {"title": "Planning", "starts_at": "2025-03-10T10:00:00Z", "duration_minutes": 60}
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty title or out-of-range duration
/// - `409 Conflict` (`schedule_conflict`): overlaps another meeting the
///   caller owns
pub async fn create_meeting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateMeetingRequest>,
) -> ApiResult<(StatusCode, Json<Meeting>)> {
    req.validate()?;

    let meeting = meetings::create_meeting(
        &state.db,
        auth.account_id,
        NewMeeting {
            title: req.title,
            starts_at: req.starts_at,
            duration_minutes: req.duration_minutes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(meeting)))
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Meeting>> {
    Ok(Json(meetings::get_meeting(&state.db, id).await?))
}

pub async fn update_meeting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMeetingRequest>,
) -> ApiResult<Json<Meeting>> {
    req.validate()?;

    let changes = UpdateMeeting {
        title: req.title,
        starts_at: req.starts_at,
        duration_minutes: req.duration_minutes,
    };
    let meeting = meetings::update_meeting(&state.db, auth.account_id, id, changes).await?;

    Ok(Json(meeting))
}

pub async fn delete_meeting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    meetings::delete_meeting(&state.db, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<AccountSummary>>> {
    let participants = meetings::list_participants(&state.db, id).await?;
    Ok(Json(participants.into_iter().map(AccountSummary::from).collect()))
}

pub async fn add_participant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<AccountSummary>)> {
    let participant =
        meetings::add_participant(&state.db, &state.scheduling, auth.account_id, id, account_id)
            .await?;

    Ok((StatusCode::CREATED, Json(participant.into())))
}

pub async fn remove_participant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    meetings::remove_participant(&state.db, &state.scheduling, auth.account_id, id, account_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
