/// Contact list endpoints (authenticated)
///
/// - `GET /v1/contacts` - the caller's contacts
/// - `POST /v1/contacts` - `{"contact_id": "<uuid>"}`, links both ways
/// - `DELETE /v1/contacts/:contact_id` - unlinks both ways

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use meetuj_shared::auth::middleware::AuthContext;
use meetuj_shared::models::account::AccountSummary;
use meetuj_shared::services::contacts;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddContactRequest {
    pub contact_id: Uuid,
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<AccountSummary>>> {
    let contacts = contacts::list_contacts(&state.db, auth.account_id).await?;
    Ok(Json(contacts.into_iter().map(AccountSummary::from).collect()))
}

/// Add a contact
///
/// # Errors
///
/// - `400 Bad Request`: the contact is the caller
/// - `404 Not Found`: no such account
/// - `409 Conflict`: already linked
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AddContactRequest>,
) -> ApiResult<(StatusCode, Json<AccountSummary>)> {
    let contact = contacts::add_contact(&state.db, auth.account_id, req.contact_id).await?;
    Ok((StatusCode::CREATED, Json(contact.into())))
}

pub async fn remove_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(contact_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    contacts::remove_contact(&state.db, auth.account_id, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
