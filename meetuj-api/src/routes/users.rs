/// Account endpoints (authenticated)
///
/// - `GET /v1/users?skip&limit` - list accounts
/// - `GET /v1/users/:id` - account by ID
/// - `GET /v1/users/by-email/:email` - account by email
/// - `GET /v1/users/me` - the caller
/// - `PUT /v1/users/me` - update email, password or picture reference
/// - `DELETE /v1/users/me` - delete the caller's account

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use meetuj_shared::auth::middleware::AuthContext;
use meetuj_shared::models::account::AccountSummary;
use meetuj_shared::services::{accounts, Pagination};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// Empty string clears the reference
    #[validate(length(max = 512, message = "Profile picture reference is too long"))]
    pub profile_picture: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<AccountSummary>>> {
    let accounts = accounts::list_accounts(&state.db, page).await?;
    Ok(Json(accounts.into_iter().map(AccountSummary::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AccountSummary>> {
    let account = accounts::get_account(&state.db, id).await?;
    Ok(Json(account.into()))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<AccountSummary>> {
    let account = accounts::find_by_email(&state.db, &email).await?;
    Ok(Json(account.into()))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AccountSummary>> {
    let account = accounts::get_account(&state.db, auth.account_id).await?;
    Ok(Json(account.into()))
}

/// Update the caller's profile
///
/// # Endpoint
///
/// ```text
/// PUT /v1/users/me
///
/// {"email": "new@example.com", "password": "another secret"}
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: malformed email or short password
/// - `409 Conflict`: email belongs to another account
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<AccountSummary>> {
    let req = UpdateProfileRequest {
        email: req.email.map(|e| e.trim().to_string()),
        ..req
    };
    req.validate()?;

    let account = accounts::update_profile(
        &state.db,
        &state.credentials,
        auth.account_id,
        accounts::ProfileChanges {
            email: req.email,
            password: req.password,
            profile_picture: req.profile_picture,
        },
    )
    .await?;

    Ok(Json(account.into()))
}

/// Deletes an account, then its picture file
///
/// A picture that cannot be removed is logged and left behind; the account
/// is already gone at that point.
pub async fn remove_account(state: &AppState, account_id: Uuid) -> ApiResult<()> {
    accounts::delete_account(&state.db, account_id).await?;

    if let Err(e) = state.pictures.remove(account_id).await {
        tracing::warn!(%account_id, error = %e, "Failed to remove profile picture");
    }

    Ok(())
}

/// Delete the caller's account, its meetings, links and picture
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    remove_account(&state, auth.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
