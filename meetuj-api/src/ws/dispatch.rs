/// Maps socket operations onto the service layer
///
/// Every operation runs as the authenticated account and goes through the
/// same services, with the same errors, as its HTTP counterpart.

use base64::{engine::general_purpose::STANDARD, Engine};
use meetuj_shared::auth::middleware::AuthContext;
use meetuj_shared::models::account::AccountSummary;
use meetuj_shared::models::meeting::UpdateMeeting;
use meetuj_shared::services::{accounts, contacts, meetings};
use serde::Serialize;
use serde_json::{json, Value};

use super::protocol::Request;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::routes::{pictures, users};

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::InternalError(format!("Failed to encode response: {}", e)))
}

fn summaries(accounts: Vec<meetuj_shared::models::account::Account>) -> Vec<AccountSummary> {
    accounts.into_iter().map(AccountSummary::from).collect()
}

/// Runs one request and returns its `data` payload
pub async fn dispatch(state: &AppState, auth: AuthContext, request: Request) -> ApiResult<Value> {
    let db = &state.db;
    let actor = auth.account_id;

    match request {
        Request::Ping {} => Ok(json!({ "pong": true })),

        Request::GetMe {} => {
            let account = accounts::get_account(db, actor).await?;
            to_data(AccountSummary::from(account))
        }

        Request::ListUsers { page } => {
            let accounts = accounts::list_accounts(db, page).await?;
            to_data(summaries(accounts))
        }

        Request::GetUser { id } => {
            let account = accounts::get_account(db, id).await?;
            to_data(AccountSummary::from(account))
        }

        Request::GetUserByEmail { email } => {
            let account = accounts::find_by_email(db, &email).await?;
            to_data(AccountSummary::from(account))
        }

        Request::UpdateMe {
            email,
            password,
            profile_picture,
        } => {
            let account = accounts::update_profile(
                db,
                &state.credentials,
                actor,
                accounts::ProfileChanges {
                    email,
                    password,
                    profile_picture,
                },
            )
            .await?;
            to_data(AccountSummary::from(account))
        }

        Request::DeleteMe {} => {
            users::remove_account(state, actor).await?;
            Ok(json!({ "deleted": actor }))
        }

        Request::UploadPicture { image } => {
            let image = STANDARD
                .decode(image.trim())
                .map_err(|e| ApiError::BadRequest(format!("Image is not valid base64: {}", e)))?;
            let account = pictures::store_picture(state, actor, &image).await?;
            to_data(AccountSummary::from(account))
        }

        Request::DownloadPicture { account_id } => {
            let image = pictures::read_picture(state, account_id.unwrap_or(actor)).await?;
            Ok(json!({ "image": STANDARD.encode(&image) }))
        }

        Request::ListContacts {} => {
            let contacts = contacts::list_contacts(db, actor).await?;
            to_data(summaries(contacts))
        }

        Request::AddContact { contact_id } => {
            let contact = contacts::add_contact(db, actor, contact_id).await?;
            to_data(AccountSummary::from(contact))
        }

        Request::RemoveContact { contact_id } => {
            contacts::remove_contact(db, actor, contact_id).await?;
            Ok(json!({ "removed": contact_id }))
        }

        Request::ListMeetings { page } => to_data(meetings::list_meetings(db, actor, page).await?),

        Request::GetMeeting { id } => to_data(meetings::get_meeting(db, id).await?),

        Request::CreateMeeting {
            title,
            starts_at,
            duration_minutes,
        } => {
            let meeting = meetings::create_meeting(
                db,
                actor,
                meetings::NewMeeting {
                    title,
                    starts_at,
                    duration_minutes,
                },
            )
            .await?;
            to_data(meeting)
        }

        Request::UpdateMeeting {
            id,
            title,
            starts_at,
            duration_minutes,
        } => {
            let changes = UpdateMeeting {
                title,
                starts_at,
                duration_minutes,
            };
            to_data(meetings::update_meeting(db, actor, id, changes).await?)
        }

        Request::DeleteMeeting { id } => {
            meetings::delete_meeting(db, actor, id).await?;
            Ok(json!({ "deleted": id }))
        }

        Request::ListParticipants { meeting_id } => {
            let participants = meetings::list_participants(db, meeting_id).await?;
            to_data(summaries(participants))
        }

        Request::AddParticipant {
            meeting_id,
            account_id,
        } => {
            let participant =
                meetings::add_participant(db, &state.scheduling, actor, meeting_id, account_id)
                    .await?;
            to_data(AccountSummary::from(participant))
        }

        Request::RemoveParticipant {
            meeting_id,
            account_id,
        } => {
            meetings::remove_participant(db, &state.scheduling, actor, meeting_id, account_id)
                .await?;
            Ok(json!({ "removed": account_id }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::test_support::offline_state;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_ping_answers_without_database() {
        let state = offline_state();
        let data = dispatch(&state, AuthContext::new(Uuid::new_v4()), Request::Ping {})
            .await
            .unwrap();
        assert_eq!(data, json!({ "pong": true }));
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_base64_before_storage() {
        let state = offline_state();
        let err = dispatch(
            &state,
            AuthContext::new(Uuid::new_v4()),
            Request::UploadPicture {
                image: "not base64!".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_me_validates_in_service() {
        let state = offline_state();
        let err = dispatch(
            &state,
            AuthContext::new(Uuid::new_v4()),
            Request::UpdateMe {
                email: None,
                password: Some("short".to_string()),
                profile_picture: None,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "invalid_input");
    }

    #[tokio::test]
    async fn test_lookup_reaches_the_database() {
        let state = offline_state();
        let err = dispatch(
            &state,
            AuthContext::new(Uuid::new_v4()),
            Request::GetUserByEmail {
                email: "nobody@example.com".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::InternalError(_)));
    }
}
