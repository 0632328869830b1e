/// Frame format
///
/// Requests:
///
/// ```json
/// {"id": 7, "op": "create_meeting", "body": {"title": "Planning", "starts_at": "2025-03-10T10:00:00Z", "duration_minutes": 60}}
/// ```
///
/// `id` is any JSON value and is echoed back; `body` may be omitted for
/// operations without parameters. Responses:
///
/// ```json
/// {"id": 7, "ok": true, "data": {...}}
/// {"id": 7, "ok": false, "error": {"code": "schedule_conflict", "message": "..."}}
/// ```

use chrono::{DateTime, Utc};
use meetuj_shared::services::Pagination;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Code sent for frames that cannot be parsed
pub const INVALID_REQUEST: &str = "invalid_request";

/// Every operation the socket accepts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", content = "body", rename_all = "snake_case")]
pub enum Request {
    Ping {},
    GetMe {},
    ListUsers {
        #[serde(flatten)]
        page: Pagination,
    },
    GetUser {
        id: Uuid,
    },
    GetUserByEmail {
        email: String,
    },
    UpdateMe {
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        password: Option<String>,
        /// Empty string clears the reference
        #[serde(default)]
        profile_picture: Option<String>,
    },
    DeleteMe {},
    /// `image` is the picture encoded as standard base64
    UploadPicture {
        image: String,
    },
    /// Defaults to the caller's own picture
    DownloadPicture {
        #[serde(default)]
        account_id: Option<Uuid>,
    },
    ListContacts {},
    AddContact {
        contact_id: Uuid,
    },
    RemoveContact {
        contact_id: Uuid,
    },
    ListMeetings {
        #[serde(flatten)]
        page: Pagination,
    },
    GetMeeting {
        id: Uuid,
    },
    CreateMeeting {
        title: String,
        starts_at: DateTime<Utc>,
        duration_minutes: i32,
    },
    UpdateMeeting {
        id: Uuid,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        starts_at: Option<DateTime<Utc>>,
        #[serde(default)]
        duration_minutes: Option<i32>,
    },
    DeleteMeeting {
        id: Uuid,
    },
    ListParticipants {
        meeting_id: Uuid,
    },
    AddParticipant {
        meeting_id: Uuid,
        account_id: Uuid,
    },
    RemoveParticipant {
        meeting_id: Uuid,
        account_id: Uuid,
    },
}

impl Request {
    /// Operation name, for logs
    pub fn op(&self) -> &'static str {
        match self {
            Request::Ping {} => "ping",
            Request::GetMe {} => "get_me",
            Request::ListUsers { .. } => "list_users",
            Request::GetUser { .. } => "get_user",
            Request::GetUserByEmail { .. } => "get_user_by_email",
            Request::UpdateMe { .. } => "update_me",
            Request::DeleteMe {} => "delete_me",
            Request::UploadPicture { .. } => "upload_picture",
            Request::DownloadPicture { .. } => "download_picture",
            Request::ListContacts {} => "list_contacts",
            Request::AddContact { .. } => "add_contact",
            Request::RemoveContact { .. } => "remove_contact",
            Request::ListMeetings { .. } => "list_meetings",
            Request::GetMeeting { .. } => "get_meeting",
            Request::CreateMeeting { .. } => "create_meeting",
            Request::UpdateMeeting { .. } => "update_meeting",
            Request::DeleteMeeting { .. } => "delete_meeting",
            Request::ListParticipants { .. } => "list_participants",
            Request::AddParticipant { .. } => "add_participant",
            Request::RemoveParticipant { .. } => "remove_participant",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Value,
    op: String,
    #[serde(default)]
    body: Value,
}

/// A frame that could not be turned into a [`Request`]
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
    /// Correlation id, when the envelope itself was readable
    pub id: Value,
    pub message: String,
}

/// Parses a text frame into its correlation id and request
pub fn parse_frame(text: &str) -> Result<(Value, Request), FrameError> {
    let envelope: Envelope = serde_json::from_str(text).map_err(|e| FrameError {
        id: Value::Null,
        message: format!("Malformed frame: {}", e),
    })?;

    // Parameterless operations may omit the body
    let body = match envelope.body {
        Value::Null => Value::Object(Default::default()),
        body => body,
    };

    let tagged = serde_json::json!({ "op": envelope.op, "body": body });
    let request = serde_json::from_value(tagged).map_err(|e| FrameError {
        id: envelope.id.clone(),
        message: format!("Invalid '{}' request: {}", envelope.op, e),
    })?;

    Ok((envelope.id, request))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One response frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Value,

    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn success(id: Value, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: Value, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }

    /// Error frame carrying the same code and client-safe message as the
    /// HTTP response would
    pub fn from_error(id: Value, err: &ApiError) -> Self {
        Self::failure(id, err.code(), err.public_message())
    }

    pub fn invalid(err: FrameError) -> Self {
        Self::failure(err.id, INVALID_REQUEST, err.message)
    }
}
