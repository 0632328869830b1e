/// Profile picture endpoints (authenticated)
///
/// - `PUT /v1/users/me/picture` - raw image bytes, at most 5 MiB
/// - `GET /v1/users/:id/picture` - JPEG bytes, or the default image
///
/// The WebSocket `upload_picture`/`download_picture` operations share
/// [`store_picture`] and [`read_picture`].

use crate::{app::AppState, error::ApiResult};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use meetuj_shared::auth::middleware::AuthContext;
use meetuj_shared::models::account::{Account, AccountSummary};
use meetuj_shared::services::accounts;
use uuid::Uuid;

/// Stores `image` as the account's picture and records its path
pub async fn store_picture(state: &AppState, account_id: Uuid, image: &[u8]) -> ApiResult<Account> {
    // Unknown accounts fail before anything is written
    accounts::get_account(&state.db, account_id).await?;

    let path = state.pictures.save(account_id, image).await?;
    let account = accounts::set_profile_picture(
        &state.db,
        account_id,
        Some(path.to_string_lossy().into_owned()),
    )
    .await?;

    Ok(account)
}

/// Loads an account's picture, falling back to the default image
pub async fn read_picture(state: &AppState, account_id: Uuid) -> ApiResult<Bytes> {
    let account = accounts::get_account(&state.db, account_id).await?;
    let image = state
        .pictures
        .load(account.id, account.profile_picture.is_some())
        .await?;

    Ok(image)
}

pub async fn upload_picture(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    image: Bytes,
) -> ApiResult<Json<AccountSummary>> {
    let account = store_picture(&state, auth.account_id, &image).await?;
    Ok(Json(account.into()))
}

pub async fn get_picture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let image = read_picture(&state, id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image))
}
